//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the account, room and message repository
//! ports, backed by PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Rows read back are re-validated through the domain
//!   constructors.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: driver failures map onto the port error enums.
//!
//! ```ignore
//! use chatmap::outbound::persistence::{DbPool, DieselRoomRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/chatmap")).await?;
//! let rooms = DieselRoomRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_basic_error_mapping;
mod diesel_message_repository;
mod diesel_room_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_room_repository::DieselRoomRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
