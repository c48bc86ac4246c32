//! Notifier that only logs. Used in development and when no relay is set.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Invitation, InvitationNotifier, NotifierError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInvitationNotifier;

#[async_trait]
impl InvitationNotifier for LoggingInvitationNotifier {
    async fn send(&self, invitation: &Invitation) -> Result<(), NotifierError> {
        info!(
            recipient = %invitation.recipient,
            room_id = %invitation.room_id,
            link = %invitation.link,
            "invitation recorded (no relay configured)"
        );
        Ok(())
    }
}
