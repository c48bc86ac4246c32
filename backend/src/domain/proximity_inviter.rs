//! Room creation with proximity-based invitation fan-out.
//!
//! Creating a room re-reads the creator, finds nearby users, picks a bounded
//! random subset, persists the room and its opening system message, warms the
//! room name cache, and notifies every invitee concurrently. Store failures
//! abort the remaining steps without rolling back earlier writes.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::future::join_all;
use mockable::Clock;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountRepository, CreateRoomRequest, DeliveryOutcome, Invitation, InvitationDelivery,
    InvitationNotifier, MessageRepository, PasswordHasher, RealtimeBroadcaster, RoomCreation,
    RoomCreationCommand, RoomNameCache, RoomRepository, sender_label,
};
use crate::domain::service_support::{
    hash_password, invalid_field, map_account_error, map_message_error, map_room_error,
};
use crate::domain::{
    ChatMessage, Error, HubEvent, Invitee, MessageBody, NearbyUser, Room, RoomId, RoomVisibility,
    SearchRadius, User, UserId, select_invitees,
};

/// Tunables for room creation.
#[derive(Debug, Clone, PartialEq)]
pub struct InviterSettings {
    /// Upper bound on invitees per room.
    pub max_invitees: usize,
    pub default_radius_meters: f64,
    pub max_radius_meters: f64,
    /// Base for invitation links.
    pub public_base_url: String,
    /// Sender label used when the creator's name is blank.
    pub from_name: String,
}

impl Default for InviterSettings {
    fn default() -> Self {
        Self {
            max_invitees: 10,
            default_radius_meters: 100_000.0,
            max_radius_meters: 500_000.0,
            public_base_url: "http://localhost:8080".to_owned(),
            from_name: "Chatmap".to_owned(),
        }
    }
}

/// Collaborators for [`ProximityInviter`].
#[derive(Clone)]
pub struct InviterPorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub room_names: Arc<dyn RoomNameCache>,
    pub notifier: Arc<dyn InvitationNotifier>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub broadcaster: Arc<dyn RealtimeBroadcaster>,
    pub clock: Arc<dyn Clock>,
}

/// Service implementing [`RoomCreationCommand`].
pub struct ProximityInviter {
    ports: InviterPorts,
    settings: InviterSettings,
    rng: Mutex<SmallRng>,
}

impl ProximityInviter {
    /// Create an inviter drawing randomness from OS entropy.
    pub fn new(ports: InviterPorts, settings: InviterSettings) -> Self {
        Self::with_rng(ports, settings, SmallRng::from_entropy())
    }

    /// Create an inviter with an explicit random source.
    pub fn with_rng(ports: InviterPorts, settings: InviterSettings, rng: SmallRng) -> Self {
        Self {
            ports,
            settings,
            rng: Mutex::new(rng),
        }
    }

    async fn load_creator(&self, creator_id: &UserId) -> Result<User, Error> {
        self.ports
            .accounts
            .find_by_id(creator_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    fn radius(&self, requested: Option<f64>) -> Result<SearchRadius, Error> {
        let meters = requested.unwrap_or(self.settings.default_radius_meters);
        SearchRadius::new(meters, self.settings.max_radius_meters)
            .map_err(|err| invalid_field("radiusMeters", "invalid_radius", err.to_string()))
    }

    fn select(&self, candidates: Vec<NearbyUser>) -> Vec<NearbyUser> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_invitees(candidates, self.settings.max_invitees, &mut *rng)
    }

    async fn notify_all(
        &self,
        room: &Room,
        sender: &str,
        selected: &[NearbyUser],
    ) -> Vec<InvitationDelivery> {
        let from_name = sender_label(sender, &self.settings.from_name);
        let sends = selected.iter().map(|invitee| {
            let invitation = Invitation::for_room(
                invitee.email.clone(),
                from_name.clone(),
                &self.settings.public_base_url,
                room.id.clone(),
                room.name.clone(),
            );
            async move {
                let outcome = match self.ports.notifier.send(&invitation).await {
                    Ok(()) => DeliveryOutcome::Delivered,
                    Err(err) => {
                        warn!(
                            error = %err,
                            room_id = %room.id,
                            recipient = %invitee.id,
                            "invitation delivery failed"
                        );
                        DeliveryOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                };
                InvitationDelivery {
                    recipient: invitee.id.clone(),
                    outcome,
                }
            }
        });
        join_all(sends).await
    }
}

#[async_trait]
impl RoomCreationCommand for ProximityInviter {
    async fn create_room(
        &self,
        creator_id: &UserId,
        request: CreateRoomRequest,
    ) -> Result<RoomCreation, Error> {
        let CreateRoomRequest {
            name,
            description,
            is_public,
            password,
            location,
            radius_meters,
        } = request;

        let creator = self.load_creator(creator_id).await?;
        let Some(creator_location) = creator.location() else {
            return Err(Error::invalid_request(
                "a resolved home location is required to create rooms",
            )
            .with_details(json!({ "code": "location_required" })));
        };
        let radius = self.radius(radius_meters)?;

        let visibility = if is_public {
            RoomVisibility::Public
        } else {
            let Some(password) = password else {
                return Err(invalid_field(
                    "password",
                    "required",
                    "private rooms require a password",
                ));
            };
            let password_hash = hash_password(&self.ports.hasher, password).await?;
            RoomVisibility::Private { password_hash }
        };

        let candidates = self
            .ports
            .accounts
            .find_within_radius(creator_location, radius, creator.id())
            .await
            .map_err(map_account_error)?;
        let candidate_count = candidates.len();
        let selected = self.select(candidates);

        let now = self.ports.clock.utc();
        let room = Room {
            id: RoomId::generate(),
            name,
            description,
            visibility,
            creator_id: creator.id().clone(),
            creator_name: creator.display_name().clone(),
            location: location.unwrap_or(creator_location),
            invitees: selected
                .iter()
                .map(|nearby| Invitee {
                    user_id: nearby.id.clone(),
                    display_name: nearby.display_name.clone(),
                })
                .collect(),
            created_at: now,
        };
        self.ports.rooms.create(&room).await.map_err(map_room_error)?;

        let announcement = ChatMessage::system(
            room.id.clone(),
            &room.name,
            creator.display_name(),
            MessageBody::room_created(creator.display_name(), &room.name),
            now,
        );
        self.ports
            .messages
            .append(&announcement)
            .await
            .map_err(map_message_error)?;

        self.ports.room_names.put(room.id.clone(), room.name.clone());

        let deliveries = self
            .notify_all(&room, creator.display_name().as_ref(), &selected)
            .await;
        self.ports.broadcaster.broadcast_all(HubEvent::RoomsChanged);

        let creation = RoomCreation { room, deliveries };
        info!(
            room_id = %creation.room.id,
            creator_id = %creator.id(),
            candidates = candidate_count,
            invited = creation.deliveries.len(),
            notified = creation.notified_count(),
            "room created"
        );
        Ok(creation)
    }
}

#[cfg(test)]
#[path = "proximity_inviter_tests.rs"]
mod tests;
