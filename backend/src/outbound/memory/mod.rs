//! In-memory store adapters.
//!
//! Used when no database URL is configured and by tests. Data lives for the
//! life of the process. Each store guards its table with a `std::sync`
//! lock that is released before returning, so no guard crosses an await.

mod accounts;
mod messages;
mod rooms;

pub use accounts::InMemoryAccountRepository;
pub use messages::InMemoryMessageRepository;
pub use rooms::InMemoryRoomRepository;
