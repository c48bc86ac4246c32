//! In-memory `MessageRepository`.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{ChatMessage, RoomId, UserId};

/// Message log grouped by room, kept in append order.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    rooms: Mutex<HashMap<RoomId, Vec<ChatMessage>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms containing at least one message sent by `user_id`.
    pub fn rooms_with_messages_from(&self, user_id: &UserId) -> HashSet<RoomId> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        rooms
            .iter()
            .filter(|(_, messages)| {
                messages
                    .iter()
                    .any(|message| message.sender_id.as_ref() == Some(user_id))
            })
            .map(|(room_id, _)| room_id.clone())
            .collect()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError> {
        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        rooms
            .entry(message.room_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent_for_room(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError> {
        let rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(messages) = rooms.get(room_id) else {
            return Ok(Vec::new());
        };
        let mut recent = messages.clone();
        // Stable sort keeps append order for equal timestamps.
        recent.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the in-memory message log.

    use super::*;
    use crate::domain::{DisplayName, MessageBody};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn message(room_id: &RoomId, sender: &UserId, body: &str, offset: i64) -> ChatMessage {
        ChatMessage::from_user(
            room_id.clone(),
            "Cafe",
            sender.clone(),
            &DisplayName::new("Ada").expect("name"),
            MessageBody::new(body).expect("body"),
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().expect("timestamp")
                + Duration::seconds(offset),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn recent_is_newest_first_and_bounded() {
        let repo = InMemoryMessageRepository::new();
        let room_id = RoomId::generate();
        let sender = UserId::random();
        // Appended out of timestamp order on purpose.
        for (body, offset) in [("b", 2), ("a", 1), ("d", 4), ("c", 3)] {
            repo.append(&message(&room_id, &sender, body, offset))
                .await
                .expect("append");
        }

        let recent = repo.recent_for_room(&room_id, 3).await.expect("recent");
        let bodies: Vec<&str> = recent.iter().map(|m| m.body.as_ref()).collect();
        assert_eq!(bodies, vec!["d", "c", "b"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_room_has_no_history() {
        let repo = InMemoryMessageRepository::new();
        let recent = repo
            .recent_for_room(&RoomId::generate(), 50)
            .await
            .expect("recent");
        assert!(recent.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn tracks_rooms_by_sender() {
        let repo = InMemoryMessageRepository::new();
        let ada = UserId::random();
        let bob = UserId::random();
        let cafe = RoomId::generate();
        let park = RoomId::generate();
        repo.append(&message(&cafe, &ada, "hi", 0)).await.expect("append");
        repo.append(&message(&park, &bob, "yo", 0)).await.expect("append");

        let rooms = repo.rooms_with_messages_from(&ada);
        assert!(rooms.contains(&cafe));
        assert!(!rooms.contains(&park));
    }
}
