//! Realtime chat service behind the WebSocket adapter.
//!
//! The hub owns no sockets. It validates requests, talks to the stores and
//! the room name cache, and pushes results through a
//! [`RealtimeBroadcaster`]. Store failures while joining, sending or
//! replaying history are logged and swallowed; the connection stays up.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountRepository, ChatParticipant, Invitation, InvitationNotifier, MessageRepository,
    RealtimeBroadcaster, RealtimeChat, RoomNameCache, RoomRepository, RoomRepositoryError,
    sender_label,
};
use crate::domain::service_support::{invalid_field, map_account_error, map_room_error};
use crate::domain::{
    ChatMessage, ConnectionId, EmailAddress, Error, HubEvent, MessageBody, RoomId, RoomName,
    UNKNOWN_ROOM_NAME, UserId,
};

/// Tunables for the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHubSettings {
    /// Messages returned per history request.
    pub history_limit: usize,
    /// Base for invitation links.
    pub public_base_url: String,
    /// Sender label used when the inviter's name is blank.
    pub from_name: String,
}

impl Default for ChatHubSettings {
    fn default() -> Self {
        Self {
            history_limit: 50,
            public_base_url: "http://localhost:8080".to_owned(),
            from_name: "Chatmap".to_owned(),
        }
    }
}

/// Collaborators for [`ChatHub`].
#[derive(Clone)]
pub struct ChatHubPorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub room_names: Arc<dyn RoomNameCache>,
    pub notifier: Arc<dyn InvitationNotifier>,
    pub broadcaster: Arc<dyn RealtimeBroadcaster>,
    pub clock: Arc<dyn Clock>,
}

/// Service implementing [`RealtimeChat`].
#[derive(Clone)]
pub struct ChatHub {
    ports: ChatHubPorts,
    settings: ChatHubSettings,
}

impl ChatHub {
    pub fn new(ports: ChatHubPorts, settings: ChatHubSettings) -> Self {
        Self { ports, settings }
    }

    /// Resolve a room name through the cache. `Ok(None)` means the room does
    /// not exist.
    async fn room_name(
        &self,
        room_id: &RoomId,
    ) -> Result<Option<RoomName>, RoomRepositoryError> {
        let name = self
            .ports
            .room_names
            .get_or_load(room_id, self.ports.rooms.as_ref())
            .await?;
        if name.is_none() {
            warn!(%room_id, "room not found");
        }
        Ok(name)
    }
}

#[async_trait]
impl RealtimeChat for ChatHub {
    async fn connect(
        &self,
        connection: ConnectionId,
        user_id: &UserId,
    ) -> Result<ChatParticipant, Error> {
        let user = self
            .ports
            .accounts
            .find_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        debug!(%connection, %user_id, "realtime connection authenticated");
        Ok(ChatParticipant {
            connection,
            user_id: user.id().clone(),
            display_name: user.display_name().clone(),
        })
    }

    async fn join(&self, participant: &ChatParticipant, room_id: &RoomId) {
        self.ports.broadcaster.join(participant.connection, room_id);
        // Warm the cache; unknown rooms are still joined.
        if let Err(err) = self.room_name(room_id).await {
            warn!(error = %err, %room_id, "room name lookup failed");
        }
        debug!(connection = %participant.connection, %room_id, "joined room");
    }

    async fn request_history(&self, participant: &ChatParticipant, room_id: &RoomId) {
        let mut messages = match self
            .ports
            .messages
            .recent_for_room(room_id, self.settings.history_limit)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, %room_id, "history lookup failed");
                return;
            }
        };
        messages.reverse();
        let delivered = self.ports.broadcaster.send_to(
            participant.connection,
            HubEvent::History {
                room_id: room_id.clone(),
                messages,
            },
        );
        if !delivered {
            debug!(connection = %participant.connection, "history dropped; connection gone");
        }
    }

    async fn send_message(
        &self,
        participant: &ChatParticipant,
        room_id: &RoomId,
        body: &str,
    ) -> Result<(), Error> {
        let body = MessageBody::new(body).map_err(|err| {
            warn!(error = %err, user_id = %participant.user_id, %room_id, "message rejected");
            invalid_field("body", "invalid_body", err.to_string())
        })?;

        let room_name = match self.room_name(room_id).await {
            Ok(Some(name)) => String::from(name),
            Ok(None) => UNKNOWN_ROOM_NAME.to_owned(),
            Err(err) => {
                warn!(error = %err, %room_id, "room name lookup failed; message dropped");
                return Ok(());
            }
        };
        let message = ChatMessage::from_user(
            room_id.clone(),
            room_name,
            participant.user_id.clone(),
            &participant.display_name,
            body,
            self.ports.clock.utc(),
        );

        if let Err(err) = self.ports.messages.append(&message).await {
            warn!(error = %err, %room_id, "message persistence failed");
            return Ok(());
        }
        let reached = self
            .ports
            .broadcaster
            .broadcast_to_room(room_id, HubEvent::Message(message));
        debug!(%room_id, reached, "message broadcast");
        Ok(())
    }

    async fn invite_user(
        &self,
        participant: &ChatParticipant,
        recipient_email: &str,
        room_id: &RoomId,
    ) -> Result<(), Error> {
        let recipient = EmailAddress::new(recipient_email)
            .map_err(|err| invalid_field("recipientEmail", "invalid_email", err.to_string()))?;
        let Some(room_name) = self.room_name(room_id).await.map_err(map_room_error)? else {
            return Err(Error::not_found(format!("room {room_id} not found")));
        };

        let invitation = Invitation::for_room(
            recipient,
            sender_label(participant.display_name.as_ref(), &self.settings.from_name),
            &self.settings.public_base_url,
            room_id.clone(),
            room_name,
        );
        match self.ports.notifier.send(&invitation).await {
            Ok(()) => info!(%room_id, inviter = %participant.user_id, "invitation sent"),
            Err(err) => warn!(error = %err, %room_id, "invitation delivery failed"),
        }
        Ok(())
    }

    fn disconnect(&self, connection: ConnectionId) {
        self.ports.broadcaster.leave_all(connection);
        debug!(%connection, "realtime connection closed");
    }
}

#[cfg(test)]
#[path = "chat_hub_tests.rs"]
mod tests;
