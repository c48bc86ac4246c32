//! chatmap backend library.
//!
//! Location-anchored chat: accounts with geocoded home locations, rooms that
//! invite a random subset of nearby users, and realtime messaging over a
//! WebSocket. The crate follows a hexagonal layout:
//!
//! - [`domain`]: types, services and ports
//! - [`inbound`]: HTTP and WebSocket adapters
//! - [`outbound`]: stores, geocoder, notifier and hasher adapters
//! - [`settings`]: layered process configuration

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
