//! Mapping from port errors to domain errors shared by the services.
//!
//! Connection failures surface as `service_unavailable` (503); query
//! failures as `internal_error`, which the HTTP layer redacts.
//!
//! Password hashing is CPU bound, so [`hash_password`] and
//! [`verify_password`] run the hasher on Tokio's blocking pool.

use std::sync::Arc;

use tokio::task::{self, JoinError};

use crate::domain::ports::{
    AccountRepositoryError, MessageRepositoryError, PasswordHasher, PasswordHasherError,
    RoomRepositoryError,
};
use crate::domain::{Error, PasswordHash, PlainPassword};

pub(crate) fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("email already registered")
        }
    }
}

pub(crate) fn map_room_error(error: RoomRepositoryError) -> Error {
    match error {
        RoomRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("room repository unavailable: {message}"))
        }
        RoomRepositoryError::Query { message } => {
            Error::internal(format!("room repository error: {message}"))
        }
    }
}

pub(crate) fn map_message_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_join_error(error: JoinError) -> Error {
    Error::internal(format!("password task failed: {error}"))
}

/// Hash `password` on the blocking pool.
pub(crate) async fn hash_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: PlainPassword,
) -> Result<PasswordHash, Error> {
    let hasher = Arc::clone(hasher);
    task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(map_join_error)?
        .map_err(map_hasher_error)
}

/// Check `password` against `hash` on the blocking pool.
pub(crate) async fn verify_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: PlainPassword,
    hash: PasswordHash,
) -> Result<bool, Error> {
    let hasher = Arc::clone(hasher);
    task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(map_join_error)?
        .map_err(map_hasher_error)
}

/// `invalid_request` carrying `{field, code}` details for a rejected input.
pub(crate) fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(serde_json::json!({
        "field": field,
        "code": code,
    }))
}
