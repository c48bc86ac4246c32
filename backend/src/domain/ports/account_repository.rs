//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, GeoPoint, NearbyUser, SearchRadius, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Durable store for registered users, keyed by id with email as login key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), AccountRepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountRepositoryError>;

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountRepositoryError>;

    /// Overwrite mutable profile fields of an existing user.
    async fn update(&self, user: &User) -> Result<(), AccountRepositoryError>;

    /// Users with a location within `radius` of `center` (haversine),
    /// excluding `exclude`. Users without a location never match.
    async fn find_within_radius(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
        exclude: &UserId,
    ) -> Result<Vec<NearbyUser>, AccountRepositoryError>;
}
