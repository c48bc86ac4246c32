//! Live connection registry backing the [`RealtimeBroadcaster`] port.
//!
//! Every socket registers an unbounded channel; the session loop drains it
//! and writes frames. Sending never waits on a client, and a closed channel
//! simply counts as an unreached connection.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::domain::ports::RealtimeBroadcaster;
use crate::domain::{ConnectionId, HubEvent, RoomId};

#[derive(Default)]
struct Registry {
    senders: HashMap<ConnectionId, UnboundedSender<HubEvent>>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// Process-wide map of live sockets and their room memberships.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<Registry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection and hand back the receiving end of its queue.
    pub fn register(&self, connection: ConnectionId) -> UnboundedReceiver<HubEvent> {
        let (tx, rx) = unbounded_channel();
        self.lock().senders.insert(connection, tx);
        debug!(%connection, "connection registered");
        rx
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.lock().senders.len()
    }

    /// Number of connections in the room.
    pub fn room_size(&self, room_id: &RoomId) -> usize {
        self.lock().rooms.get(room_id).map_or(0, HashSet::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RealtimeBroadcaster for ConnectionRegistry {
    fn join(&self, connection: ConnectionId, room_id: &RoomId) {
        let mut registry = self.lock();
        if !registry.senders.contains_key(&connection) {
            debug!(%connection, %room_id, "join ignored; connection not registered");
            return;
        }
        registry
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection);
    }

    fn leave_all(&self, connection: ConnectionId) {
        let mut registry = self.lock();
        registry.senders.remove(&connection);
        registry.rooms.retain(|_, members| {
            members.remove(&connection);
            !members.is_empty()
        });
    }

    fn send_to(&self, connection: ConnectionId, event: HubEvent) -> bool {
        self.lock()
            .senders
            .get(&connection)
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    fn broadcast_to_room(&self, room_id: &RoomId, event: HubEvent) -> usize {
        let registry = self.lock();
        let Some(members) = registry.rooms.get(room_id) else {
            return 0;
        };
        members
            .iter()
            .filter_map(|connection| registry.senders.get(connection))
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }

    fn broadcast_all(&self, event: HubEvent) -> usize {
        self.lock()
            .senders
            .values()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }
}
