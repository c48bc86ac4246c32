//! Authentication primitives: passwords, hashes, and login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Maximum accepted password length in bytes.
pub const PASSWORD_MAX: usize = 1024;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Password was empty.
    EmptyPassword,
    /// Password exceeded [`PASSWORD_MAX`] bytes.
    PasswordTooLong { max: usize },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} bytes")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl CredentialsValidationError {
    /// Request field the error relates to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(inner) => inner.field(),
            Self::EmptyPassword | Self::PasswordTooLong { .. } => "password",
        }
    }
}

/// Caller-supplied secret, wiped from memory on drop.
///
/// Whitespace is preserved verbatim so comparisons are never surprising.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate a raw password.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if raw.len() > PASSWORD_MAX {
            return Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// One-way password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`PasswordHasher`] adapter.
    ///
    /// [`PasswordHasher`]: crate::domain::ports::PasswordHasher
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use chatmap::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialsValidationError::Email)?;
        let password = PlainPassword::new(password)?;
        Ok(Self { email, password })
    }

    /// Login key.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", "email")]
    #[case("not-an-email", "pw", "email")]
    #[case("ada@example.com", "", "password")]
    fn invalid_credentials_report_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "  pass word ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.password().expose(), "  pass word ");
    }

    #[rstest]
    fn oversized_passwords_are_rejected() {
        let long = "x".repeat(PASSWORD_MAX + 1);
        assert_eq!(
            PlainPassword::new(&long),
            Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX })
        );
    }

    #[rstest]
    fn secrets_are_redacted_in_debug_output() {
        let password = PlainPassword::new("hunter2").expect("valid password");
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{password:?}").contains("hunter2"));
        assert!(!format!("{hash:?}").contains("secret"));
    }
}
