//! Port abstraction for room persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Room, RoomId, RoomName, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by room repository adapters.
    pub enum RoomRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "room repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "room repository query failed: {message}",
    }
}

/// Durable store for rooms. Rooms are written once and never mutated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError>;

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError>;

    /// Name-only lookup used to fill the room name cache.
    async fn find_name(&self, id: &RoomId) -> Result<Option<RoomName>, RoomRepositoryError>;

    /// Most recently created rooms first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Room>, RoomRepositoryError>;

    /// Case-insensitive substring match on name or description, newest first.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Room>, RoomRepositoryError>;

    /// Rooms the user created, was invited to, or posted in; newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Room>, RoomRepositoryError>;
}
