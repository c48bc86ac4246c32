//! Read-side room queries.
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{PasswordHasher, RoomQuery, RoomRepository};
use crate::domain::service_support::{invalid_field, map_room_error, verify_password};
use crate::domain::{Error, PlainPassword, Room, RoomId, RoomSummary, RoomVisibility, UserId};

/// Default page size for listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;
/// Longest accepted search keyword, in characters.
pub const SEARCH_KEYWORD_MAX: usize = 64;

/// Service implementing [`RoomQuery`].
#[derive(Clone)]
pub struct RoomDirectory {
    rooms: Arc<dyn RoomRepository>,
    hasher: Arc<dyn PasswordHasher>,
    list_limit: usize,
}

impl RoomDirectory {
    pub fn new(rooms: Arc<dyn RoomRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            rooms,
            hasher,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Override the listing page size.
    #[must_use]
    pub fn with_list_limit(mut self, list_limit: usize) -> Self {
        self.list_limit = list_limit;
        self
    }

    async fn load(&self, room_id: &RoomId) -> Result<Room, Error> {
        self.rooms
            .find_by_id(room_id)
            .await
            .map_err(map_room_error)?
            .ok_or_else(|| Error::not_found(format!("room {room_id} not found")))
    }
}

fn summaries(rooms: Vec<Room>) -> Vec<RoomSummary> {
    rooms.iter().map(Room::summary).collect()
}

#[async_trait]
impl RoomQuery for RoomDirectory {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, Error> {
        let rooms = self
            .rooms
            .list_recent(self.list_limit)
            .await
            .map_err(map_room_error)?;
        Ok(summaries(rooms))
    }

    async fn search_rooms(&self, keyword: &str) -> Result<Vec<RoomSummary>, Error> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.list_rooms().await;
        }
        if keyword.chars().count() > SEARCH_KEYWORD_MAX {
            return Err(invalid_field(
                "q",
                "too_long",
                format!("search keyword must be at most {SEARCH_KEYWORD_MAX} characters"),
            ));
        }
        let rooms = self
            .rooms
            .search(keyword, self.list_limit)
            .await
            .map_err(map_room_error)?;
        Ok(summaries(rooms))
    }

    async fn room_history(&self, user_id: &UserId) -> Result<Vec<RoomSummary>, Error> {
        let rooms = self
            .rooms
            .list_for_user(user_id, self.list_limit)
            .await
            .map_err(map_room_error)?;
        Ok(summaries(rooms))
    }

    async fn fetch_room(&self, room_id: &RoomId) -> Result<RoomSummary, Error> {
        Ok(self.load(room_id).await?.summary())
    }

    async fn verify_password(
        &self,
        room_id: &RoomId,
        password: &PlainPassword,
    ) -> Result<bool, Error> {
        match self.load(room_id).await?.visibility {
            RoomVisibility::Public => Ok(true),
            RoomVisibility::Private { password_hash } => {
                verify_password(&self.hasher, password.clone(), password_hash).await
            }
        }
    }
}
