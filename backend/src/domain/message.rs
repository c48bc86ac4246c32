//! Append-only chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::room::{RoomId, RoomName};
use super::user::{DisplayName, UserId};

/// Name recorded when a message targets a room that cannot be resolved.
/// Never cached.
pub const UNKNOWN_ROOM_NAME: &str = "Unknown room";
/// Maximum message body length in characters.
pub const MESSAGE_BODY_MAX: usize = 2000;

/// Validation errors for message bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    #[error("message body must not be empty")]
    EmptyBody,
    #[error("message body must be at most {max} characters")]
    BodyTooLong { max: usize },
}

/// Trimmed message text, 1 to [`MESSAGE_BODY_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MessageValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MessageValidationError::EmptyBody);
        }
        if trimmed.chars().count() > MESSAGE_BODY_MAX {
            return Err(MessageValidationError::BodyTooLong {
                max: MESSAGE_BODY_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Body of the system message announcing a new room.
    pub fn room_created(creator: &DisplayName, room: &RoomName) -> Self {
        Self(format!("{creator} created the room {room}"))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<MessageBody> for String {
    fn from(value: MessageBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = MessageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Origin of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    System,
}

impl MessageKind {
    /// Storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }

    /// Parse a storage label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A persisted chat message.
///
/// ## Invariants
/// - `sender_id` is `None` exactly when `kind` is [`MessageKind::System`].
/// - `room_name` is the name resolved at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub room_id: RoomId,
    pub room_name: String,
    #[schema(value_type = Option<String>)]
    pub sender_id: Option<UserId>,
    pub sender_name: String,
    #[schema(value_type = String)]
    pub body: MessageBody,
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Message typed by a user.
    pub fn from_user(
        room_id: RoomId,
        room_name: impl Into<String>,
        sender_id: UserId,
        sender_name: &DisplayName,
        body: MessageBody,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            room_name: room_name.into(),
            sender_id: Some(sender_id),
            sender_name: sender_name.to_string(),
            body,
            kind: MessageKind::User,
            sent_at,
        }
    }

    /// Message generated by the service on behalf of `sender_name`.
    pub fn system(
        room_id: RoomId,
        room_name: &RoomName,
        sender_name: &DisplayName,
        body: MessageBody,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            room_name: room_name.to_string(),
            sender_id: None,
            sender_name: sender_name.to_string(),
            body,
            kind: MessageKind::System,
            sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", MessageValidationError::EmptyBody)]
    #[case(" \n ", MessageValidationError::EmptyBody)]
    fn blank_bodies_are_rejected(#[case] raw: &str, #[case] expected: MessageValidationError) {
        assert_eq!(MessageBody::new(raw), Err(expected));
    }

    #[rstest]
    fn body_length_is_bounded() {
        assert!(MessageBody::new("a".repeat(MESSAGE_BODY_MAX)).is_ok());
        assert_eq!(
            MessageBody::new("a".repeat(MESSAGE_BODY_MAX + 1)),
            Err(MessageValidationError::BodyTooLong {
                max: MESSAGE_BODY_MAX
            })
        );
    }

    #[rstest]
    fn room_created_text_names_creator_and_room() {
        let creator = DisplayName::new("Ada").expect("name");
        let room = RoomName::new("Harbour walk").expect("room");
        assert_eq!(
            MessageBody::room_created(&creator, &room).as_ref(),
            "Ada created the room Harbour walk"
        );
    }

    #[rstest]
    #[case(MessageKind::User)]
    #[case(MessageKind::System)]
    fn kind_labels_parse_back(#[case] kind: MessageKind) {
        assert_eq!(MessageKind::parse(kind.as_str()), Some(kind));
    }

    #[rstest]
    fn system_messages_have_no_sender_id() {
        let message = ChatMessage::system(
            RoomId::generate(),
            &RoomName::new("Cafe").expect("room"),
            &DisplayName::new("Ada").expect("name"),
            MessageBody::new("hello").expect("body"),
            Utc::now(),
        );
        let value = serde_json::to_value(&message).expect("serialise");
        assert_eq!(value["kind"], "system");
        assert!(value["senderId"].is_null());
        assert_eq!(value["roomName"], "Cafe");
    }
}
