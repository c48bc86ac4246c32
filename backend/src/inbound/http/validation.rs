//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejected field surfaces as `invalid_request` with
//! `{"field": ..., "code": ...}` details so clients can highlight the input.

use std::fmt::Display;

use serde_json::json;

use crate::domain::{
    CredentialsValidationError, Error, GeoValidationError, RoomValidationError,
    UserValidationError,
};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// A domain validation failure that can be pinned to a request field.
pub(crate) trait FieldViolation: Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

impl FieldViolation for UserValidationError {
    fn field(&self) -> &'static str {
        UserValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::EmptyEmail | Self::EmptyDisplayName | Self::EmptyPostalCode => {
                "empty"
            }
            Self::InvalidId | Self::InvalidEmail => "invalid_format",
            Self::EmailTooLong { .. }
            | Self::DisplayNameTooLong { .. }
            | Self::PostalCodeTooLong { .. } => "too_long",
            Self::DisplayNameInvalidCharacters | Self::PostalCodeInvalidCharacters => {
                "invalid_characters"
            }
        }
    }
}

impl FieldViolation for CredentialsValidationError {
    fn field(&self) -> &'static str {
        CredentialsValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Email(inner) => inner.code(),
            Self::EmptyPassword => "empty",
            Self::PasswordTooLong { .. } => "too_long",
        }
    }
}

impl FieldViolation for RoomValidationError {
    fn field(&self) -> &'static str {
        RoomValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_format",
            Self::EmptyName => "empty",
            Self::NameTooLong { .. } | Self::DescriptionTooLong { .. } => "too_long",
            Self::MissingPassword => "required",
        }
    }
}

impl FieldViolation for GeoValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::InvalidRadius | Self::RadiusTooLarge { .. } => "radiusMeters",
            Self::InvalidCountryCode => "country",
            Self::NonFinite
            | Self::LongitudeOutOfRange(_)
            | Self::LatitudeOutOfRange(_)
            | Self::IncompletePoint => "location",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NonFinite => "non_finite",
            Self::LongitudeOutOfRange(_) | Self::LatitudeOutOfRange(_) => "out_of_range",
            Self::IncompletePoint => "incomplete",
            Self::InvalidCountryCode => "invalid_format",
            Self::InvalidRadius => "invalid_radius",
            Self::RadiusTooLarge { .. } => "too_large",
        }
    }
}

/// Convert a field violation into an `invalid_request` error.
pub(crate) fn field_error<E: FieldViolation>(violation: &E) -> Error {
    Error::invalid_request(violation.to_string()).with_details(json!({
        "field": violation.field(),
        "code": violation.code(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

/// Unwrap a required payload field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}
