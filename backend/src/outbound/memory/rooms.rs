//! In-memory `RoomRepository`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{RoomRepository, RoomRepositoryError};
use crate::domain::{Room, RoomId, RoomName, UserId};

use super::InMemoryMessageRepository;

/// Room table. Holds the message log so per-user history can include rooms
/// the user only posted in.
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
    messages: Arc<InMemoryMessageRepository>,
}

impl InMemoryRoomRepository {
    /// Create a room table that consults `messages` for per-user history.
    pub fn new(messages: Arc<InMemoryMessageRepository>) -> Self {
        Self {
            rooms: Mutex::default(),
            messages,
        }
    }

    fn newest_first(&self, limit: usize, keep: impl Fn(&Room) -> bool) -> Vec<Room> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let mut matching: Vec<Room> = rooms.values().filter(|room| keep(room)).cloned().collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_ref().cmp(a.id.as_ref()))
        });
        matching.truncate(limit);
        matching
    }
}

fn contains_ignoring_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError> {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        if rooms.contains_key(&room.id) {
            return Err(RoomRepositoryError::query(format!(
                "room {} already exists",
                room.id
            )));
        }
        rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rooms.get(id).cloned())
    }

    async fn find_name(&self, id: &RoomId) -> Result<Option<RoomName>, RoomRepositoryError> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rooms.get(id).map(|room| room.name.clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Room>, RoomRepositoryError> {
        Ok(self.newest_first(limit, |_| true))
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Room>, RoomRepositoryError> {
        let needle = keyword.to_lowercase();
        Ok(self.newest_first(limit, |room| {
            contains_ignoring_case(room.name.as_ref(), &needle)
                || room
                    .description
                    .as_deref()
                    .is_some_and(|description| contains_ignoring_case(description, &needle))
        }))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Room>, RoomRepositoryError> {
        let posted_in = self.messages.rooms_with_messages_from(user_id);
        Ok(self.newest_first(limit, |room| {
            &room.creator_id == user_id
                || room.invitees.iter().any(|invitee| &invitee.user_id == user_id)
                || posted_in.contains(&room.id)
        }))
    }
}
