//! Driving port for room listings and lookups.

use async_trait::async_trait;

use crate::domain::{Error, PlainPassword, RoomId, RoomSummary, UserId};

/// Domain use-case port for reading rooms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomQuery: Send + Sync {
    /// Newest rooms first.
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, Error>;

    /// Keyword search over names and descriptions.
    async fn search_rooms(&self, keyword: &str) -> Result<Vec<RoomSummary>, Error>;

    /// Rooms the user created, was invited to, or posted in.
    async fn room_history(&self, user_id: &UserId) -> Result<Vec<RoomSummary>, Error>;

    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSummary, Error>;

    /// Check a private room password; public rooms always pass.
    async fn verify_password(
        &self,
        room_id: &RoomId,
        password: &PlainPassword,
    ) -> Result<bool, Error>;
}
