//! Wire-level event definitions for the chat socket.
//!
//! Frames are JSON objects tagged by `type` with camelCase fields:
//!
//! ```text
//! -> {"type":"join","roomId":"room_..."}
//! -> {"type":"sendMessage","roomId":"room_...","body":"hello"}
//! <- {"type":"message","message":{...}}
//! <- {"type":"error","code":"invalid_request","message":"..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, Error, HubEvent, RoomId};

/// Event sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Join { room_id: String },
    #[serde(rename_all = "camelCase")]
    RequestHistory { room_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage { room_id: String, body: String },
    #[serde(rename_all = "camelCase")]
    InviteUser {
        recipient_email: String,
        room_id: String,
    },
}

impl ClientEvent {
    /// Room the event targets, unvalidated.
    pub fn raw_room_id(&self) -> &str {
        match self {
            Self::Join { room_id }
            | Self::RequestHistory { room_id }
            | Self::SendMessage { room_id, .. }
            | Self::InviteUser { room_id, .. } => room_id,
        }
    }
}

/// Event pushed to a client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    Message {
        message: ChatMessage,
    },
    #[serde(rename_all = "camelCase")]
    History {
        room_id: RoomId,
        messages: Vec<ChatMessage>,
    },
    RoomsChanged {},
    /// A request failed; the connection stays open.
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    /// Error frame with an explicit code.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<HubEvent> for ServerEvent {
    fn from(value: HubEvent) -> Self {
        match value {
            HubEvent::Message(message) => Self::Message { message },
            HubEvent::History { room_id, messages } => Self::History { room_id, messages },
            HubEvent::RoomsChanged => Self::RoomsChanged {},
        }
    }
}

impl From<&Error> for ServerEvent {
    fn from(value: &Error) -> Self {
        // Prefer the field-level code when the domain supplied one.
        let code = value
            .details()
            .and_then(|details| details.get("code"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| value.code().as_str().to_owned(), str::to_owned);
        Self::error(code, value.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, MessageBody, UserId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"type": "join", "roomId": "room_x"}), ClientEvent::Join { room_id: "room_x".into() })]
    #[case(
        json!({"type": "requestHistory", "roomId": "room_x"}),
        ClientEvent::RequestHistory { room_id: "room_x".into() }
    )]
    #[case(
        json!({"type": "sendMessage", "roomId": "room_x", "body": "hi"}),
        ClientEvent::SendMessage { room_id: "room_x".into(), body: "hi".into() }
    )]
    #[case(
        json!({"type": "inviteUser", "recipientEmail": "bo@example.com", "roomId": "room_x"}),
        ClientEvent::InviteUser { recipient_email: "bo@example.com".into(), room_id: "room_x".into() }
    )]
    fn client_events_parse(#[case] raw: Value, #[case] expected: ClientEvent) {
        let parsed: ClientEvent = serde_json::from_value(raw).expect("client event");
        assert_eq!(parsed.raw_room_id(), "room_x");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case(json!({"type": "shout", "roomId": "room_x"}))]
    #[case(json!({"type": "sendMessage", "roomId": "room_x"}))]
    #[case(json!({"roomId": "room_x"}))]
    fn malformed_client_events_fail(#[case] raw: Value) {
        assert!(serde_json::from_value::<ClientEvent>(raw).is_err());
    }

    #[rstest]
    fn message_event_uses_camel_case() {
        let room_id = RoomId::generate();
        let message = ChatMessage::from_user(
            room_id.clone(),
            "Cafe",
            UserId::random(),
            &DisplayName::new("Ada").expect("name"),
            MessageBody::new("hello").expect("body"),
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
                .single()
                .expect("timestamp"),
        );

        let value = serde_json::to_value(ServerEvent::from(HubEvent::Message(message)))
            .expect("serialise");

        assert_eq!(value.get("type"), Some(&json!("message")));
        assert_eq!(value.pointer("/message/roomName"), Some(&json!("Cafe")));
        assert_eq!(
            value.pointer("/message/roomId"),
            Some(&json!(room_id.to_string()))
        );
    }

    #[rstest]
    fn history_and_rooms_changed_shapes() {
        let room_id = RoomId::generate();
        let history = serde_json::to_value(ServerEvent::from(HubEvent::History {
            room_id: room_id.clone(),
            messages: Vec::new(),
        }))
        .expect("serialise");
        assert_eq!(
            history,
            json!({"type": "history", "roomId": room_id.to_string(), "messages": []})
        );

        let changed = serde_json::to_value(ServerEvent::from(HubEvent::RoomsChanged))
            .expect("serialise");
        assert_eq!(changed, json!({"type": "roomsChanged"}));
    }

    #[rstest]
    fn domain_errors_prefer_detail_codes() {
        let err = Error::invalid_request("message body must not be empty")
            .with_details(json!({"field": "body", "code": "invalid_body"}));
        assert_eq!(
            ServerEvent::from(&err),
            ServerEvent::error("invalid_body", "message body must not be empty")
        );

        let plain = Error::not_found("room missing");
        assert_eq!(
            ServerEvent::from(&plain),
            ServerEvent::error("not_found", "room missing")
        );
    }
}
