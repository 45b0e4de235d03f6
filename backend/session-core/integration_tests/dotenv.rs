use session_core::config::try_load_dotenv;

use std::env;

use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: A `.env` in the working directory is picked up.
///
/// **WHY THIS MATTERS**: Local setups configure `WA_BRIDGE_*` through `.env`
/// rather than exporting variables by hand.
///
/// **BUG THIS CATCHES**: Would catch if the working directory lookup was
/// skipped or the file was found but not applied.
#[test]
#[serial]
fn given_env_file_in_working_dir_when_try_load_dotenv_then_loaded() {
    // GIVEN: A working directory with a .env file
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "WA_BRIDGE_DOTENV_TEST_MARKER=from-dotenv\n",
    )
    .unwrap();
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();

    // WHEN: Loading
    let result = try_load_dotenv();
    env::set_current_dir(previous).unwrap();

    // THEN: The file is reported and its variable is visible
    assert!(result.loaded);
    assert_eq!(
        result.path.as_deref().and_then(|p| p.file_name()),
        Some(std::ffi::OsStr::new(".env"))
    );
    assert_eq!(
        env::var("WA_BRIDGE_DOTENV_TEST_MARKER").as_deref(),
        Ok("from-dotenv")
    );
}
