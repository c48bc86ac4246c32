//! Session key fingerprinting.
//!
//! Startup logs a truncated SHA-256 digest of the signing key so operators can
//! tell which key a running instance holds without the key itself leaving the
//! process.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Lowercase hex of the first 8 bytes of `sha256(key.signing())`.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use chatmap::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
