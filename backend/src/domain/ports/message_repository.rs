//! Port abstraction for chat message persistence.
use async_trait::async_trait;

use crate::domain::{ChatMessage, RoomId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

/// Append-only message log, partitioned by room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn append(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError>;

    /// Up to `limit` messages for the room, newest first.
    async fn recent_for_room(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError>;
}
