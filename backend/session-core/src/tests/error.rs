// Unit tests for error construction, messages and location capture.

use crate::error::config::ConfigError;
use crate::error::{BackendError, CoreError, SessionError};

use std::time::Duration;

/// **VALUE**: `#[track_caller]` constructors record the call site, not the constructor.
///
/// **BUG THIS CATCHES**: Dropping `#[track_caller]` makes every error point at
/// `error/session.rs`, which is useless when reading logs.
#[test]
fn given_constructor_when_called_then_location_points_at_caller() {
    let error = SessionError::pairing_stream("boom");

    let rendered = error.to_string();

    assert!(
        rendered.contains("tests/error.rs"),
        "expected caller location in {rendered}"
    );
}

#[test]
fn given_backend_source_when_wrapped_then_message_names_operation() {
    let cases = [
        (
            SessionError::store(BackendError::store_closed()),
            "Session store failure: session store is closed",
        ),
        (
            SessionError::identity(BackendError::store("bad key")),
            "Unable to read device identity: bad key",
        ),
        (
            SessionError::reachability(BackendError::not_connected("offline")),
            "Reachability check failed: offline",
        ),
        (
            SessionError::send("a@s.test", BackendError::rejected("too large")),
            "Message submission failed: too large",
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.message(), expected);
    }
}

#[test]
fn given_pairing_timeout_when_message_then_includes_duration() {
    let error = SessionError::pairing_timeout(Duration::from_secs(60));

    assert_eq!(
        error.message(),
        "Timed out after 60s waiting for pairing code"
    );
    assert_eq!(error.error_category(), "pairing_timeout");
}

#[test]
fn given_io_error_when_converted_then_store_error() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");

    let error = BackendError::from(io);

    assert!(matches!(error, BackendError::Store { .. }));
    assert_eq!(error.message(), "read-only");
}

#[test]
fn given_json_error_when_converted_then_corrupt_store_message() {
    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

    let error = BackendError::from(json);

    assert!(error.message().starts_with("Corrupt store file:"));
}

#[test]
fn given_domain_errors_when_aggregated_then_core_error_is_transparent() {
    let session: CoreError = SessionError::unavailable("gone").into();
    let config: CoreError = ConfigError::ValidationError {
        location: common::ErrorLocation::caller(),
        reason: "bad port".to_string(),
    }
    .into();

    assert!(session.to_string().starts_with("Controller Unavailable Error: gone"));
    assert!(config.to_string().starts_with("Config Validation Error: bad port"));
}
