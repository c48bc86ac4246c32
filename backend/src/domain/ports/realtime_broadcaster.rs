//! Port for pushing hub events to live connections.
//!
//! Implementations only buffer events for delivery; they never block on a
//! slow client. Membership is keyed by [`ConnectionId`].

use crate::domain::{ConnectionId, HubEvent, RoomId};

/// Room-membership aware event fan-out.
#[cfg_attr(test, mockall::automock)]
pub trait RealtimeBroadcaster: Send + Sync {
    /// Add the connection to the room's broadcast group.
    fn join(&self, connection: ConnectionId, room_id: &RoomId);

    /// Remove the connection from every group and forget it.
    fn leave_all(&self, connection: ConnectionId);

    /// Deliver to a single connection. Returns `false` if it is gone.
    fn send_to(&self, connection: ConnectionId, event: HubEvent) -> bool;

    /// Deliver to every member of the room. Returns the number reached.
    fn broadcast_to_room(&self, room_id: &RoomId, event: HubEvent) -> usize;

    /// Deliver to every live connection. Returns the number reached.
    fn broadcast_all(&self, event: HubEvent) -> usize;
}
