// Unit tests for logger module initialization logic

use crate::error::BridgeError;
use crate::logger::{LOG_FILE_NAME, initialize, open_log_file};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Startup paths and tests may both reach the logger. A
/// second call must not try to install a second global logger.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when setting a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path(), None);
    let result2 = initialize(temp_dir.path(), None);

    // THEN: Both return Ok (second one logs warning but doesn't error)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

#[test]
fn given_missing_directory_when_open_log_file_then_created() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("nested").join("logs");

    let file = open_log_file(&log_dir);

    assert!(file.is_ok());
    assert!(log_dir.join(LOG_FILE_NAME).exists());
}

/// **VALUE**: Verifies that an unusable log directory is reported, not panicked on.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` errors were unwrapped,
/// turning a permissions problem into a crash at startup.
#[test]
fn given_invalid_log_dir_when_open_log_file_then_returns_logger_error() {
    // GIVEN: A path below a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Opening the log file there
    let result = open_log_file(&invalid_dir);

    // THEN: Logger error, not a panic
    let err = result.expect_err("Should return error for invalid log directory");
    assert!(
        format!("{err:?}").contains("Logger"),
        "Error should be BridgeError::Logger variant"
    );
}

#[test]
fn given_invalid_log_dir_when_open_log_file_then_location_points_at_call_site() {
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    let expected_line = line!() + 1;
    let result = open_log_file(&invalid_dir);

    match result {
        Err(BridgeError::Logger { location, .. }) => {
            assert_eq!(location.line, expected_line);
            assert!(location.file.ends_with("logger.rs"));
            assert!(location.file.contains("tests"));
        }
        other => panic!("expected Logger error, got {other:?}"),
    }
}
