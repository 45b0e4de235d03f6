pub mod paths;

pub use paths::{BridgePaths, PathSource, try_load_dotenv};

use crate::controller::{ControllerSettings, PairingMode};
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

const MIN_PAIRING_TIMEOUT_SECS: u64 = 1;
const MAX_PAIRING_TIMEOUT_SECS: u64 = 600;

pub const ENV_HOST: &str = "WA_BRIDGE_HOST";
pub const ENV_PORT: &str = "WA_BRIDGE_PORT";
pub const ENV_PAIRING_TIMEOUT_SECS: &str = "WA_BRIDGE_PAIRING_TIMEOUT_SECS";
pub const ENV_FORCE_RELINK: &str = "WA_BRIDGE_FORCE_RELINK";
pub const ENV_LOG_LEVEL: &str = "WA_BRIDGE_LOG_LEVEL";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Overrides `{data_dir}/session.json`.
    #[serde(default)]
    pub store_file: Option<PathBuf>,
    #[serde(default = "default_pairing_timeout_secs")]
    pub pairing_timeout_secs: u64,
    /// Relink policy when a pairing request does not say.
    #[serde(default = "default_force_relink")]
    pub force_relink: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_file: None,
            pairing_timeout_secs: default_pairing_timeout_secs(),
            force_relink: default_force_relink(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`. Build default when unset.
    #[serde(default)]
    pub level: Option<String>,
    /// Overrides `{data_dir}/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopbackConfig {
    /// Phone numbers the offline network treats as registered.
    #[serde(default)]
    pub registered_numbers: Vec<String>,
    /// Simulated scan delay after a pairing code is issued. No scan when unset.
    #[serde(default)]
    pub scan_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub loopback: LoopbackConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
            loopback: LoopbackConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    crate::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    crate::DEFAULT_PORT
}
fn default_pairing_timeout_secs() -> u64 {
    60
}
fn default_force_relink() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BridgeConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.server.port == 0 {
            return Err(validation_error("server.port must be non-zero"));
        }

        if IpAddr::from_str(&self.server.host).is_err() {
            return Err(validation_error(format!(
                "Invalid server.host: {} (must be an IP address)",
                self.server.host
            )));
        }

        let timeout = self.session.pairing_timeout_secs;
        if !(MIN_PAIRING_TIMEOUT_SECS..=MAX_PAIRING_TIMEOUT_SECS).contains(&timeout) {
            return Err(validation_error(format!(
                "Invalid session.pairing_timeout_secs: {} (must be {}-{})",
                timeout, MIN_PAIRING_TIMEOUT_SECS, MAX_PAIRING_TIMEOUT_SECS
            )));
        }

        if let Some(level) = &self.logging.level {
            if LevelFilter::from_str(level).is_err() {
                return Err(validation_error(format!("Invalid logging.level: {level}")));
            }
        }

        Ok(())
    }

    /// Apply `WA_BRIDGE_*` variables from the process environment, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvError`] if a variable is set but unparsable,
    /// or [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an explicit lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = parse_env(ENV_PORT, &port)?;
        }
        if let Some(secs) = lookup(ENV_PAIRING_TIMEOUT_SECS) {
            self.session.pairing_timeout_secs = parse_env(ENV_PAIRING_TIMEOUT_SECS, &secs)?;
        }
        if let Some(force) = lookup(ENV_FORCE_RELINK) {
            self.session.force_relink = parse_bool(ENV_FORCE_RELINK, &force)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = Some(level);
        }

        self.validate()
    }

    /// Address the HTTP adapter binds to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `server.host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = IpAddr::from_str(&self.server.host).map_err(|e| {
            validation_error(format!("Invalid server.host {}: {e}", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_secs(self.session.pairing_timeout_secs)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            pairing_timeout: self.pairing_timeout(),
        }
    }

    pub fn default_pairing_mode(&self) -> PairingMode {
        PairingMode::from_force(self.session.force_relink)
    }

    /// Configured log level, `None` to use the build default.
    pub fn log_level(&self) -> Option<LevelFilter> {
        self.logging
            .level
            .as_deref()
            .and_then(|level| LevelFilter::from_str(level).ok())
    }

    pub fn scan_delay(&self) -> Option<Duration> {
        self.loopback.scan_delay_ms.map(Duration::from_millis)
    }
}

#[track_caller]
fn validation_error(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}

#[track_caller]
fn parse_env<T>(variable: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::EnvError {
        location: ErrorLocation::from(Location::caller()),
        variable: variable.to_string(),
        reason: format!("{value:?}: {e}"),
    })
}

#[track_caller]
fn parse_bool(variable: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvError {
            location: ErrorLocation::from(Location::caller()),
            variable: variable.to_string(),
            reason: format!("{value:?} is not a boolean"),
        }),
    }
}
