//! Driving port for creating rooms and inviting nearby users.

use async_trait::async_trait;

use crate::domain::{Error, GeoPoint, PlainPassword, Room, RoomName, UserId};

/// Validated room creation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoomRequest {
    pub name: RoomName,
    pub description: Option<String>,
    pub is_public: bool,
    /// Required when `is_public` is false.
    pub password: Option<PlainPassword>,
    /// Room anchor; defaults to the creator's location.
    pub location: Option<GeoPoint>,
    /// Search radius in metres; defaults to the configured value.
    pub radius_meters: Option<f64>,
}

/// Result of notifying one invitee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
}

/// Per-recipient fan-out result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationDelivery {
    pub recipient: UserId,
    pub outcome: DeliveryOutcome,
}

impl InvitationDelivery {
    pub fn delivered(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Delivered)
    }
}

/// Outcome of a successful room creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomCreation {
    pub room: Room,
    pub deliveries: Vec<InvitationDelivery>,
}

impl RoomCreation {
    /// Number of invitations that reached the notifier successfully.
    pub fn notified_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.delivered()).count()
    }
}

/// Domain use-case port for room creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomCreationCommand: Send + Sync {
    async fn create_room(
        &self,
        creator_id: &UserId,
        request: CreateRoomRequest,
    ) -> Result<RoomCreation, Error>;
}
