// Unit tests for config/data directory resolution.
// Uses explicit lookups instead of mutating the process environment.

use crate::config::paths::{ENV_CONFIG_DIR, ENV_DATA_DIR};
use crate::config::{BridgePaths, PathSource};
use crate::error::config::ConfigError;

use std::path::{Path, PathBuf};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn given_no_overrides_when_resolve_then_platform_dirs_with_app_name() {
    let paths = BridgePaths::resolve(
        no_env,
        Some(PathBuf::from("/home/u/.config")),
        Some(PathBuf::from("/home/u/.local/share")),
    )
    .unwrap();

    assert_eq!(paths.config_dir, PathBuf::from("/home/u/.config/wa-bridge"));
    assert_eq!(
        paths.data_dir,
        PathBuf::from("/home/u/.local/share/wa-bridge")
    );
    assert_eq!(paths.source, PathSource::PlatformDefault);
}

#[test]
fn given_both_overrides_when_resolve_then_used_verbatim() {
    let lookup = |name: &str| match name {
        ENV_CONFIG_DIR => Some("/etc/wa".to_string()),
        ENV_DATA_DIR => Some("/var/lib/wa".to_string()),
        _ => None,
    };

    let paths = BridgePaths::resolve(lookup, None, None).unwrap();

    assert_eq!(paths.config_dir, PathBuf::from("/etc/wa"));
    assert_eq!(paths.data_dir, PathBuf::from("/var/lib/wa"));
    assert_eq!(paths.source, PathSource::EnvVar);
}

#[test]
fn given_one_override_when_resolve_then_mixed_source() {
    let lookup = |name: &str| (name == ENV_DATA_DIR).then(|| "/srv/wa".to_string());

    let paths = BridgePaths::resolve(lookup, Some(PathBuf::from("/cfg")), None).unwrap();

    assert_eq!(paths.config_dir, PathBuf::from("/cfg/wa-bridge"));
    assert_eq!(paths.data_dir, PathBuf::from("/srv/wa"));
    assert_eq!(paths.source, PathSource::Mixed);
}

/// **VALUE**: No silent fallback to the working directory.
///
/// **BUG THIS CATCHES**: Writing the session store relative to wherever the
/// binary happened to be started would scatter credentials across the disk.
#[test]
fn given_no_platform_dir_and_no_override_when_resolve_then_directory_not_found() {
    let result = BridgePaths::resolve(no_env, None, Some(PathBuf::from("/data")));

    match result {
        Err(ConfigError::DirectoryNotFound { reason, .. }) => {
            assert!(reason.contains(ENV_CONFIG_DIR));
        }
        other => panic!("Expected DirectoryNotFound, got {other:?}"),
    }
}

#[test]
fn given_blank_override_when_resolve_then_ignored() {
    let lookup = |name: &str| (name == ENV_CONFIG_DIR).then(|| "  ".to_string());

    let paths = BridgePaths::resolve(lookup, Some(PathBuf::from("/cfg")), Some(PathBuf::from("/d")))
        .unwrap();

    assert_eq!(paths.config_dir, PathBuf::from("/cfg/wa-bridge"));
}

#[test]
fn given_configured_paths_when_deriving_files_then_configured_wins() {
    let paths = BridgePaths::resolve(no_env, Some(PathBuf::from("/c")), Some(PathBuf::from("/d")))
        .unwrap();

    assert_eq!(
        paths.store_file(None),
        PathBuf::from("/d/wa-bridge/session.json")
    );
    assert_eq!(
        paths.store_file(Some(Path::new("/tmp/s.json"))),
        PathBuf::from("/tmp/s.json")
    );
    assert_eq!(paths.log_dir(None), PathBuf::from("/d/wa-bridge/logs"));
}
