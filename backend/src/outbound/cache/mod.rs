//! Process-local room name cache.
//!
//! Backs the `RoomNameCache` port with a read-mostly map. Locks are never
//! held across an await point: the loader call in
//! [`RoomNameCache::get_or_load`] happens between a `get` and a `put`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::RoomNameCache;
use crate::domain::{RoomId, RoomName};

/// In-memory room name cache shared by every service in the process.
#[derive(Debug, Default)]
pub struct InMemoryRoomNameCache {
    entries: RwLock<HashMap<RoomId, RoomName>>,
}

impl InMemoryRoomNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached rooms.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RoomNameCache for InMemoryRoomNameCache {
    fn get(&self, room_id: &RoomId) -> Option<RoomName> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room_id)
            .cloned()
    }

    fn put(&self, room_id: RoomId, name: RoomName) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(room_id, name);
    }
}
