//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **cache**: the in-memory room name cache
//! - **geocoding**: Nominatim-backed postal code resolution
//! - **notification**: webhook and logging invitation notifiers
//! - **crypto**: Argon2id password hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod crypto;
pub mod geocoding;
pub mod memory;
pub mod notification;
pub mod persistence;
