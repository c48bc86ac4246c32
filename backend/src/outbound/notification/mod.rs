//! Invitation delivery adapters.
//!
//! - **webhook**: POSTs each invitation as JSON to a mail relay or similar
//! - **logging**: records invitations in the log when no relay is configured

mod logging;
mod webhook;

pub use logging::LoggingInvitationNotifier;
pub use webhook::WebhookInvitationNotifier;
