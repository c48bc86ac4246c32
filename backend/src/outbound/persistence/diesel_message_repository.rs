//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.
//!
//! History reads are served by the `(room_id, sent_at DESC)` index.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{ChatMessage, MessageBody, MessageKind, RoomId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed implementation of the message repository port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessageRepositoryError {
    map_basic_pool_error(error, MessageRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_basic_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> MessageRepositoryError {
    MessageRepositoryError::query(format!("stored message has invalid {field}: {err}"))
}

fn row_to_message(row: MessageRow) -> Result<ChatMessage, MessageRepositoryError> {
    let MessageRow {
        id,
        room_id,
        room_name,
        sender_id,
        sender_name,
        body,
        kind,
        sent_at,
    } = row;

    Ok(ChatMessage {
        id,
        room_id: RoomId::new(&room_id).map_err(|err| corrupt("room id", err))?,
        room_name,
        sender_id: sender_id.map(UserId::from_uuid),
        sender_name,
        body: MessageBody::new(&body).map_err(|err| corrupt("body", err))?,
        kind: MessageKind::parse(&kind).ok_or_else(|| corrupt("kind", &kind))?,
        sent_at,
    })
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn append(&self, message: &ChatMessage) -> Result<(), MessageRepositoryError> {
        let new_row = NewMessageRow {
            id: message.id,
            room_id: message.room_id.as_ref(),
            room_name: &message.room_name,
            sender_id: message.sender_id.as_ref().map(|id| *id.as_uuid()),
            sender_name: &message.sender_name,
            body: message.body.as_ref(),
            kind: message.kind.as_str(),
            sent_at: message.sent_at,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(messages::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn recent_for_room(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = messages::table
            .filter(messages::room_id.eq(room_id.as_ref()))
            .select(MessageRow::as_select())
            .order((messages::sent_at.desc(), messages::id.desc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<MessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for row mapping.

    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(kind: &str, sender_id: Option<Uuid>) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4(),
            room_id: RoomId::generate().to_string(),
            room_name: "Cafe".to_owned(),
            sender_id,
            sender_name: "Ada".to_owned(),
            body: "hello".to_owned(),
            kind: kind.to_owned(),
            sent_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("user", Some(Uuid::new_v4()), MessageKind::User)]
    #[case("system", None, MessageKind::System)]
    fn rows_convert(
        #[case] kind: &str,
        #[case] sender: Option<Uuid>,
        #[case] expected: MessageKind,
    ) {
        let message = row_to_message(row(kind, sender)).expect("valid row");
        assert_eq!(message.kind, expected);
        assert_eq!(message.sender_id, sender.map(UserId::from_uuid));
    }

    #[rstest]
    fn unknown_kinds_are_query_errors() {
        let err = row_to_message(row("whisper", None)).expect_err("bad kind");
        assert!(matches!(err, MessageRepositoryError::Query { .. }));
    }
}
