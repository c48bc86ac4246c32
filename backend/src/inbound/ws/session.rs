//! Per-connection WebSocket handler.
//!
//! Keeps framing and heartbeats at the edge and defers chat behaviour to the
//! injected [`RealtimeChat`] port. Hub events for this connection arrive on
//! the channel handed out by the registry and are written as JSON frames.
//! The socket pings every 5s and is closed after 10s without client
//! traffic; tests shorten both.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{ChatParticipant, RealtimeChat};
use crate::domain::{HubEvent, RoomId};
use crate::inbound::ws::messages::{ClientEvent, ServerEvent};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    chat: Arc<dyn RealtimeChat>,
    participant: ChatParticipant,
    events: UnboundedReceiver<HubEvent>,
    session: Session,
    stream: MessageStream,
) {
    let connection = participant.connection;
    WsSession::new(Arc::clone(&chat), participant)
        .run(session, stream, events)
        .await;
    chat.disconnect(connection);
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    Evicted,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    chat: Arc<dyn RealtimeChat>,
    participant: ChatParticipant,
}

impl WsSession {
    fn new(chat: Arc<dyn RealtimeChat>, participant: ChatParticipant) -> Self {
        Self { chat, participant }
    }

    async fn run(
        &self,
        mut session: Session,
        mut stream: MessageStream,
        mut events: UnboundedReceiver<HubEvent>,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                event = events.recv() => {
                    self.handle_hub_event(&mut session, event).await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_hub_event(
        &self,
        session: &mut Session,
        event: Option<HubEvent>,
    ) -> Result<(), SessionError> {
        let Some(event) = event else {
            return Err(SessionError::Evicted);
        };
        self.send_json(session, &ServerEvent::from(event))
            .await
            .map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let reply = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.dispatch(event).await,
            Err(error) => {
                warn!(
                    error = %error,
                    connection = %self.participant.connection,
                    "rejected malformed WebSocket payload"
                );
                Some(ServerEvent::error("invalid_payload", "malformed event"))
            }
        };

        match reply {
            Some(reply) => self
                .send_json(session, &reply)
                .await
                .map_err(SessionError::Network),
            None => Ok(()),
        }
    }

    /// Run one client event. Returns an error frame for the client, if any.
    async fn dispatch(&self, event: ClientEvent) -> Option<ServerEvent> {
        let room_id = match RoomId::new(event.raw_room_id()) {
            Ok(room_id) => room_id,
            Err(error) => {
                debug!(error = %error, "rejected event with malformed room id");
                return Some(ServerEvent::error("invalid_room_id", error.to_string()));
            }
        };
        let participant = &self.participant;

        let outcome = match event {
            ClientEvent::Join { .. } => {
                self.chat.join(participant, &room_id).await;
                Ok(())
            }
            ClientEvent::RequestHistory { .. } => {
                self.chat.request_history(participant, &room_id).await;
                Ok(())
            }
            ClientEvent::SendMessage { body, .. } => {
                self.chat.send_message(participant, &room_id, &body).await
            }
            ClientEvent::InviteUser {
                recipient_email, ..
            } => {
                self.chat
                    .invite_user(participant, &recipient_email, &room_id)
                    .await
            }
        };
        outcome.err().map(|error| ServerEvent::from(&error))
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                // Debug builds fail fast on schema drift; release keeps the socket.
                if cfg!(debug_assertions) {
                    panic!("hub events must serialize: {error}");
                } else {
                    warn!(error = %error, "Failed to serialize WebSocket payload");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        let connection = self.participant.connection;
        match error {
            SessionError::HeartbeatTimeout => {
                warn!(%connection, "WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(%connection, error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(%connection, error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::Evicted => {
                debug!(%connection, "connection dropped from registry");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::Evicted => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("connection closed by server".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
