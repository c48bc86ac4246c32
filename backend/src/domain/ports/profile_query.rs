//! Driving port for reading the current user's profile.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserProfile};

/// Domain use-case port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user; `unauthorized` when the
    /// session refers to an account that no longer resolves.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
