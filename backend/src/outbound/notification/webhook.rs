//! Reqwest-backed webhook notifier.
//!
//! Each invitation is POSTed as a camelCase JSON document. A non-2xx reply
//! maps to [`NotifierError::Rejected`]; network failures and timeouts map to
//! [`NotifierError::Transport`]. There is no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::domain::ports::{Invitation, InvitationNotifier, NotifierError};

const USER_AGENT: &str = "chatmap-backend-notifier/0.1";
const PREVIEW_CHAR_LIMIT: usize = 160;

pub struct WebhookInvitationNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookInvitationNotifier {
    /// Build a notifier posting to `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl InvitationNotifier for WebhookInvitationNotifier {
    async fn send(&self, invitation: &Invitation) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(invitation)
            .send()
            .await
            .map_err(|err| NotifierError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // The body is only diagnostic; a failed read still reports the status.
        let body = response.text().await.unwrap_or_default();
        Err(NotifierError::rejected(status.as_u16(), preview(&body)))
    }
}

fn preview(body: &str) -> String {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let head = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
        format!("{head}...")
    } else {
        compact
    }
}
