//! Chat rooms anchored to a map point.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::PasswordHash;
use super::geo::GeoPoint;
use super::user::{DisplayName, UserId};

/// Prefix carried by every room identifier.
pub const ROOM_ID_PREFIX: &str = "room_";
/// Maximum room name length in characters.
pub const ROOM_NAME_MAX: usize = 64;
/// Maximum room description length in characters.
pub const ROOM_DESCRIPTION_MAX: usize = 500;

/// Validation errors for room value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomValidationError {
    #[error("room id must look like room_<32 hex digits>")]
    InvalidId,
    #[error("room name must not be empty")]
    EmptyName,
    #[error("room name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("room description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("private rooms require a password")]
    MissingPassword,
}

impl RoomValidationError {
    /// Request field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "roomId",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
            Self::MissingPassword => "password",
        }
    }
}

/// Time-ordered, collision-resistant room identifier (`room_` + UUID v7).
///
/// # Examples
/// ```
/// use chatmap::domain::RoomId;
///
/// let id = RoomId::generate();
/// assert!(id.as_ref().starts_with("room_"));
/// assert_eq!(RoomId::new(id.as_ref()).unwrap(), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(format!("{ROOM_ID_PREFIX}{}", Uuid::now_v7().simple()))
    }

    /// Validate an identifier received from a client or the store.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RoomValidationError> {
        let raw = raw.as_ref();
        let suffix = raw
            .strip_prefix(ROOM_ID_PREFIX)
            .ok_or(RoomValidationError::InvalidId)?;
        if suffix.len() != 32 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RoomValidationError::InvalidId);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }
}

impl AsRef<str> for RoomId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Room display name, 1 to [`ROOM_NAME_MAX`] characters once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RoomValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RoomValidationError::EmptyName);
        }
        if trimmed.chars().count() > ROOM_NAME_MAX {
            return Err(RoomValidationError::NameTooLong { max: ROOM_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoomName> for String {
    fn from(value: RoomName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = RoomValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate an optional description; blank input collapses to `None`.
pub fn room_description(raw: Option<&str>) -> Result<Option<String>, RoomValidationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > ROOM_DESCRIPTION_MAX {
        return Err(RoomValidationError::DescriptionTooLong {
            max: ROOM_DESCRIPTION_MAX,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Who may enter a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomVisibility {
    Public,
    /// Entry is gated by a password check.
    Private { password_hash: PasswordHash },
}

impl RoomVisibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn password_hash(&self) -> Option<&PasswordHash> {
        match self {
            Self::Public => None,
            Self::Private { password_hash } => Some(password_hash),
        }
    }
}

/// Entry in the invitee snapshot taken at room creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitee {
    #[schema(value_type = String)]
    pub user_id: UserId,
    #[schema(value_type = String)]
    pub display_name: DisplayName,
}

/// Immutable room record.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub description: Option<String>,
    pub visibility: RoomVisibility,
    pub creator_id: UserId,
    pub creator_name: DisplayName,
    pub location: GeoPoint,
    pub invitees: Vec<Invitee>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Public view without the password hash.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            is_public: self.visibility.is_public(),
            creator_id: self.creator_id.clone(),
            creator_name: self.creator_name.clone(),
            location: self.location,
            invitees: self.invitees.clone(),
            created_at: self.created_at,
        }
    }
}

/// Room data returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[schema(value_type = String, example = "room_01890a5d8b2c7e6f9a1b2c3d4e5f6a7b")]
    pub id: RoomId,
    #[schema(value_type = String, example = "Shibuya lunch club")]
    pub name: RoomName,
    pub description: Option<String>,
    pub is_public: bool,
    #[schema(value_type = String)]
    pub creator_id: UserId,
    #[schema(value_type = String)]
    pub creator_name: DisplayName,
    #[schema(value_type = Object)]
    pub location: GeoPoint,
    pub invitees: Vec<Invitee>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_ids_validate_and_are_unique() {
        let a = RoomId::generate();
        let b = RoomId::generate();
        assert_ne!(a, b);
        assert_eq!(RoomId::new(a.as_ref()), Ok(a.clone()));
    }

    #[rstest]
    fn generated_ids_sort_by_creation_time() {
        let first = RoomId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RoomId::generate();
        assert!(first.as_ref() < second.as_ref());
    }

    #[rstest]
    #[case("")]
    #[case("room_")]
    #[case("chat_0123456789abcdef0123456789abcdef")]
    #[case("room_0123456789abcdef0123456789abcdeg")]
    #[case("room_0123456789abcdef")]
    fn malformed_ids_are_rejected(#[case] raw: &str) {
        assert_eq!(RoomId::new(raw), Err(RoomValidationError::InvalidId));
    }

    #[rstest]
    fn room_name_is_trimmed_and_bounded() {
        assert_eq!(RoomName::new("  Cafe  ").expect("valid").as_ref(), "Cafe");
        assert_eq!(RoomName::new(" "), Err(RoomValidationError::EmptyName));
        assert_eq!(
            RoomName::new("x".repeat(ROOM_NAME_MAX + 1)),
            Err(RoomValidationError::NameTooLong { max: ROOM_NAME_MAX })
        );
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" weekend hikes "), Some("weekend hikes"))]
    fn description_is_normalised(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(
            room_description(raw).expect("valid"),
            expected.map(str::to_owned)
        );
    }

    #[rstest]
    fn description_is_bounded() {
        let long = "d".repeat(ROOM_DESCRIPTION_MAX + 1);
        assert!(room_description(Some(&long)).is_err());
    }
}
