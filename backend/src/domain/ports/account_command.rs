//! Driving port for account registration, login, and profile edits.
//!
//! Inbound adapters validate raw payloads into these request types and call
//! the port without importing persistence, geocoding, or hashing concerns.

use async_trait::async_trait;

use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, PlainPassword, PostalCode, UserId,
    UserProfile,
};

/// Validated registration payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRequest {
    pub email: EmailAddress,
    pub password: PlainPassword,
    pub display_name: DisplayName,
    pub postal_code: PostalCode,
}

/// Validated profile edit. Absent fields are left unchanged.
///
/// `email` is accepted only so a change attempt can be rejected explicitly;
/// email addresses are immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: Option<EmailAddress>,
    pub display_name: Option<DisplayName>,
    pub postal_code: Option<PostalCode>,
}

/// Domain use-case port for account lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account, geocoding the postal code when possible.
    async fn register(&self, request: RegistrationRequest) -> Result<UserProfile, Error>;

    /// Validate credentials and return the authenticated profile.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error>;

    /// Apply a profile edit for the authenticated user.
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Error>;
}
