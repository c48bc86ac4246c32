//! Realtime hub vocabulary shared by the chat service and the socket adapter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::message::ChatMessage;
use super::room::RoomId;

/// Process-unique identifier for a live socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Event pushed from the hub to one or more connections.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// A message was posted to a room the connection joined.
    Message(ChatMessage),
    /// Reply to a history request, oldest first.
    History {
        room_id: RoomId,
        messages: Vec<ChatMessage>,
    },
    /// The room list changed; clients should refetch it.
    RoomsChanged,
}
