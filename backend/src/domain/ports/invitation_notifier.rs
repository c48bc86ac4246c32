//! Port for delivering room invitations out of band (email, webhook).
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{EmailAddress, RoomId, RoomName};

use super::define_port_error;

/// Subject line used for every room invitation.
pub const INVITATION_SUBJECT: &str = "You're invited to a new chat room";

define_port_error! {
    /// Delivery errors raised by notifier adapters.
    pub enum NotifierError {
        /// The transport could not reach the delivery service.
        Transport { message: String } => "invitation transport failed: {message}",
        /// The delivery service rejected the invitation.
        Rejected { status: u16, message: String } => "invitation rejected with status {status}: {message}",
    }
}

/// Invitation payload handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub recipient: EmailAddress,
    pub from_name: String,
    pub subject: String,
    pub room_id: RoomId,
    pub room_name: RoomName,
    pub link: String,
}

impl Invitation {
    /// Build an invitation whose link points at `{base_url}/chat/{room_id}`.
    pub fn for_room(
        recipient: EmailAddress,
        from_name: impl Into<String>,
        base_url: &str,
        room_id: RoomId,
        room_name: RoomName,
    ) -> Self {
        let link = format!("{}/chat/{room_id}", base_url.trim_end_matches('/'));
        Self {
            recipient,
            from_name: from_name.into(),
            subject: INVITATION_SUBJECT.to_owned(),
            room_id,
            room_name,
            link,
        }
    }
}

/// Name shown as the invitation's sender: the inviting user's display name,
/// or `fallback` when that name is blank.
pub fn sender_label(display_name: &str, fallback: &str) -> String {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Opaque `notify(address, payload)` capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationNotifier: Send + Sync {
    async fn send(&self, invitation: &Invitation) -> Result<(), NotifierError>;
}
