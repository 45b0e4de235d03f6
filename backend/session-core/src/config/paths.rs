//! Platform-aware detection of the bridge's config and data directories.
//!
//! Lookup order, per directory:
//! 1. `WA_BRIDGE_CONFIG_DIR` / `WA_BRIDGE_DATA_DIR` environment variable
//! 2. Platform-specific directory via `dirs` crate
//!
//! Returns Result, never silently falls back to a relative path.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

pub const ENV_CONFIG_DIR: &str = "WA_BRIDGE_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "WA_BRIDGE_DATA_DIR";

const APP_DIR_NAME: &str = "wa-bridge";
const STORE_FILE_NAME: &str = "session.json";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone)]
pub struct BridgePaths {
    /// Holds `config.json`.
    pub config_dir: PathBuf,
    /// Holds the session store and logs.
    pub data_dir: PathBuf,
    pub source: PathSource,
}

/// How the directories were determined (for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    /// Both set via environment variables.
    EnvVar,
    /// Both from the platform config/data directories.
    PlatformDefault,
    /// One overridden, the other from the platform.
    Mixed,
}

impl fmt::Display for PathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSource::EnvVar => write!(f, "{ENV_CONFIG_DIR}/{ENV_DATA_DIR}"),
            PathSource::PlatformDefault => write!(f, "platform default"),
            PathSource::Mixed => write!(f, "environment + platform default"),
        }
    }
}

impl BridgePaths {
    /// Detect directories from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if no override is set and the
    /// platform has no config or data directory.
    ///
    /// # Platform Behavior
    /// - **Linux**: `$XDG_CONFIG_HOME/wa-bridge`, `$XDG_DATA_HOME/wa-bridge`
    /// - **macOS**: `~/Library/Application Support/wa-bridge` for both
    /// - **Windows**: `%APPDATA%\wa-bridge`, `%LOCALAPPDATA%\wa-bridge`
    pub fn detect() -> Result<Self, ConfigError> {
        Self::resolve(
            |name| env::var(name).ok(),
            dirs::config_dir(),
            dirs::data_local_dir(),
        )
    }

    /// Resolve directories from an explicit variable lookup and platform bases.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        platform_config: Option<PathBuf>,
        platform_data: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config_override = lookup(ENV_CONFIG_DIR).filter(|dir| !dir.trim().is_empty());
        let data_override = lookup(ENV_DATA_DIR).filter(|dir| !dir.trim().is_empty());

        let source = match (&config_override, &data_override) {
            (Some(_), Some(_)) => PathSource::EnvVar,
            (None, None) => PathSource::PlatformDefault,
            _ => PathSource::Mixed,
        };

        let config_dir = match config_override {
            Some(dir) => {
                info!("Using {ENV_CONFIG_DIR} override: {dir}");
                PathBuf::from(dir)
            }
            None => platform_config
                .map(|base| base.join(APP_DIR_NAME))
                .ok_or_else(|| ConfigError::DirectoryNotFound {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!(
                        "Cannot determine config directory. Set {ENV_CONFIG_DIR} environment variable."
                    ),
                })?,
        };

        let data_dir = match data_override {
            Some(dir) => {
                info!("Using {ENV_DATA_DIR} override: {dir}");
                PathBuf::from(dir)
            }
            None => platform_data
                .map(|base| base.join(APP_DIR_NAME))
                .ok_or_else(|| ConfigError::DirectoryNotFound {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!(
                        "Cannot determine data directory. Set {ENV_DATA_DIR} environment variable."
                    ),
                })?,
        };

        debug!(
            "Bridge paths: config {:?}, data {:?} ({source})",
            config_dir, data_dir
        );

        Ok(Self {
            config_dir,
            data_dir,
            source,
        })
    }

    /// Session store file; `configured` wins when set.
    pub fn store_file(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) => path.to_path_buf(),
            None => self.data_dir.join(STORE_FILE_NAME),
        }
    }

    /// Log directory; `configured` wins when set.
    pub fn log_dir(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) => path.to_path_buf(),
            None => self.data_dir.join(LOG_DIR_NAME),
        }
    }
}

/// Result of attempting to load a .env file.
#[derive(Debug)]
pub struct EnvLoadResult {
    /// Path to loaded .env file, if found.
    pub path: Option<PathBuf>,
    /// Whether any .env file was loaded.
    pub loaded: bool,
}

/// Attempts to load .env from the working directory, then the executable's directory.
///
/// Variables already present in the environment are never overwritten.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded .env from: {:?}", path);
        return EnvLoadResult {
            path: Some(path),
            loaded: true,
        };
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let env_path = exe_dir.join(".env");
            if env_path.exists() {
                match dotenvy::from_path(&env_path) {
                    Ok(_) => {
                        info!("Loaded .env from: {:?}", env_path);
                        return EnvLoadResult {
                            path: Some(env_path),
                            loaded: true,
                        };
                    }
                    Err(e) => {
                        warn!("Failed to parse .env at {:?}: {}", env_path, e);
                    }
                }
            }
        }
    }

    debug!("No .env file found");
    EnvLoadResult {
        path: None,
        loaded: false,
    }
}
