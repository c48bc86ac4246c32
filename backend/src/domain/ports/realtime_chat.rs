//! Driving port for the realtime hub.
//!
//! The socket adapter calls this port for every inbound frame. Results reach
//! clients through the [`RealtimeBroadcaster`](super::RealtimeBroadcaster),
//! so most operations only report validation failures back to the caller.

use async_trait::async_trait;

use crate::domain::{ConnectionId, DisplayName, Error, RoomId, UserId};

/// Authenticated identity bound to a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatParticipant {
    pub connection: ConnectionId,
    pub user_id: UserId,
    pub display_name: DisplayName,
}

/// Domain use-case port for realtime chat.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RealtimeChat: Send + Sync {
    /// Resolve the session user; `unauthorized` if it no longer exists.
    async fn connect(
        &self,
        connection: ConnectionId,
        user_id: &UserId,
    ) -> Result<ChatParticipant, Error>;

    /// Join the room's broadcast group. Unknown rooms are joined anyway.
    async fn join(&self, participant: &ChatParticipant, room_id: &RoomId);

    /// Send recent history to the requesting connection only.
    async fn request_history(&self, participant: &ChatParticipant, room_id: &RoomId);

    /// Persist and broadcast a message; `invalid_request` for bad bodies.
    async fn send_message(
        &self,
        participant: &ChatParticipant,
        room_id: &RoomId,
        body: &str,
    ) -> Result<(), Error>;

    /// Send a single out-of-band invitation.
    async fn invite_user(
        &self,
        participant: &ChatParticipant,
        recipient_email: &str,
        room_id: &RoomId,
    ) -> Result<(), Error>;

    /// Drop the connection from every room.
    fn disconnect(&self, connection: ConnectionId);
}
