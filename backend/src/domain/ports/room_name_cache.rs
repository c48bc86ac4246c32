//! Process-local memo of room id to room name.
//!
//! Entries live for the whole process: rooms are never renamed, so there is
//! no eviction or invalidation. Fills are idempotent and last-write-wins;
//! concurrent misses for the same id may each hit the store.

use async_trait::async_trait;

use crate::domain::{RoomId, RoomName};

use super::{RoomRepository, RoomRepositoryError};

/// Injectable room name cache.
#[async_trait]
pub trait RoomNameCache: Send + Sync {
    fn get(&self, room_id: &RoomId) -> Option<RoomName>;

    fn put(&self, room_id: RoomId, name: RoomName);

    /// Return the cached name, or perform exactly one store lookup and cache
    /// its result. Unknown rooms yield `Ok(None)` and are not cached.
    async fn get_or_load(
        &self,
        room_id: &RoomId,
        loader: &dyn RoomRepository,
    ) -> Result<Option<RoomName>, RoomRepositoryError> {
        if let Some(name) = self.get(room_id) {
            return Ok(Some(name));
        }
        tracing::debug!(%room_id, "room name cache miss");
        let loaded = loader.find_name(room_id).await?;
        if let Some(name) = &loaded {
            self.put(room_id.clone(), name.clone());
        }
        Ok(loaded)
    }
}
