//! Unit tests for session toggle validation.

use super::*;
use rstest::{fixture, rstest};
use std::io::Write;
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'a'; len]).expect("write key bytes");
    file
}

#[fixture]
fn long_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn toggles(key: &NamedTempFile, same_site: &str) -> SessionToggles {
    SessionToggles {
        key_file: Some(key.path().to_path_buf()),
        cookie_secure: true,
        same_site: same_site.to_owned(),
        allow_ephemeral: false,
    }
}

fn expect_error(result: Result<SessionSettings, SessionConfigError>) -> SessionConfigError {
    match result {
        Ok(_) => panic!("expected session settings to be rejected"),
        Err(error) => error,
    }
}

#[rstest]
#[case("Strict", SameSite::Strict)]
#[case("lax", SameSite::Lax)]
#[case(" NONE ", SameSite::None)]
fn release_accepts_valid_toggles(
    long_key: NamedTempFile,
    #[case] raw: &str,
    #[case] expected: SameSite,
) {
    let settings = session_settings(&toggles(&long_key, raw), BuildMode::Release)
        .expect("valid release settings");
    assert_eq!(settings.same_site, expected);
    assert!(settings.cookie_secure);
}

#[rstest]
fn release_rejects_unknown_same_site(long_key: NamedTempFile) {
    let err = expect_error(session_settings(
        &toggles(&long_key, "sometimes"),
        BuildMode::Release,
    ));
    assert!(matches!(
        err,
        SessionConfigError::InvalidToggle {
            name: "session_same_site",
            ..
        }
    ));
}

#[rstest]
fn debug_falls_back_to_lax_for_unknown_same_site(long_key: NamedTempFile) {
    let settings = session_settings(&toggles(&long_key, "sometimes"), BuildMode::Debug)
        .expect("debug tolerates bad toggles");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case(BuildMode::Release, false)]
#[case(BuildMode::Debug, true)]
fn same_site_none_requires_secure_cookie_in_release(
    long_key: NamedTempFile,
    #[case] mode: BuildMode,
    #[case] accepted: bool,
) {
    let mut insecure = toggles(&long_key, "None");
    insecure.cookie_secure = false;

    let result = session_settings(&insecure, mode);

    assert_eq!(result.is_ok(), accepted);
    if let Err(err) = result {
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }
}

#[rstest]
fn release_rejects_ephemeral_keys(long_key: NamedTempFile) {
    let mut ephemeral = toggles(&long_key, "Strict");
    ephemeral.allow_ephemeral = true;
    let err = expect_error(session_settings(&ephemeral, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let err = expect_error(session_settings(
        &toggles(&short, "Strict"),
        BuildMode::Release,
    ));
    match err {
        SessionConfigError::KeyTooShort {
            length, min_len, ..
        } => {
            assert_eq!(length, SESSION_KEY_MIN_LEN - 1);
            assert_eq!(min_len, SESSION_KEY_MIN_LEN);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn release_requires_a_readable_key() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = SessionToggles {
        key_file: Some(dir.path().join("absent")),
        ..SessionToggles::default()
    };
    let err = expect_error(session_settings(&missing, BuildMode::Release));
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
#[case(BuildMode::Debug, false)]
#[case(BuildMode::Debug, true)]
fn debug_generates_a_key_when_the_file_is_missing(
    #[case] mode: BuildMode,
    #[case] allow_ephemeral: bool,
) {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = SessionToggles {
        key_file: Some(dir.path().join("absent")),
        allow_ephemeral,
        ..SessionToggles::default()
    };
    assert!(session_settings(&missing, mode).is_ok());
}

#[rstest]
fn debug_tolerates_keys_too_short_to_derive() {
    let tiny = key_file(8);
    assert!(session_settings(&toggles(&tiny, "lax"), BuildMode::Debug).is_ok());
}

#[rstest]
fn keys_from_the_same_file_are_stable(long_key: NamedTempFile) {
    let first = session_settings(&toggles(&long_key, "lax"), BuildMode::Release)
        .expect("first read");
    let second = session_settings(&toggles(&long_key, "lax"), BuildMode::Release)
        .expect("second read");
    assert_eq!(
        fingerprint::key_fingerprint(&first.key),
        fingerprint::key_fingerprint(&second.key)
    );
}
