use session_core::error::config::ConfigError;
use session_core::error::server::ServerError;
use session_core::error::{BackendError, SessionError};

use common::ErrorLocation;

use thiserror::Error;

/// Errors that stop the bridge from starting or shutting down cleanly.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Session store could not be opened.
    #[error("Store Error: {message} {location}")]
    Store {
        message: String,
        location: ErrorLocation,
    },

    /// HTTP adapter failed to bind or stop.
    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },

    #[error("Shutdown Error: {message} {location}")]
    Shutdown {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for BridgeError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        BridgeError::Config {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<BackendError> for BridgeError {
    #[track_caller]
    fn from(error: BackendError) -> Self {
        BridgeError::Store {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<ServerError> for BridgeError {
    #[track_caller]
    fn from(error: ServerError) -> Self {
        BridgeError::Server {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<SessionError> for BridgeError {
    #[track_caller]
    fn from(error: SessionError) -> Self {
        BridgeError::Shutdown {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
