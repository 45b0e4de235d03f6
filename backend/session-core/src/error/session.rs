//! Error taxonomy of the session controller.
//!
//! Every variant is reported to callers as `ConnectionStatus::LibraryError`
//! together with [`SessionError::message`]. Nothing here is retried.

use crate::error::backend::BackendError;

use common::ErrorLocation;

use std::time::Duration;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Store Access Error: {source} {location}")]
    Store {
        location: ErrorLocation,
        #[source]
        source: BackendError,
    },

    #[error("Identity Lookup Error: {source} {location}")]
    Identity {
        location: ErrorLocation,
        #[source]
        source: BackendError,
    },

    #[error("Connect Error: {source} {location}")]
    Connect {
        location: ErrorLocation,
        #[source]
        source: BackendError,
    },

    #[error("Reachability Error: {source} {location}")]
    Reachability {
        location: ErrorLocation,
        #[source]
        source: BackendError,
    },

    #[error("Send Error: recipient {recipient}: {source} {location}")]
    Send {
        recipient: String,
        location: ErrorLocation,
        #[source]
        source: BackendError,
    },

    #[error("Pairing Stream Error: {message} {location}")]
    PairingStream {
        message: String,
        location: ErrorLocation,
    },

    #[error("Pairing Timeout Error: no pairing code after {timeout:?} {location}")]
    PairingTimeout {
        timeout: Duration,
        location: ErrorLocation,
    },

    #[error("Controller Unavailable Error: {message} {location}")]
    Unavailable {
        message: String,
        location: ErrorLocation,
    },
}

impl SessionError {
    #[track_caller]
    pub fn store(source: BackendError) -> Self {
        SessionError::Store {
            location: ErrorLocation::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn identity(source: BackendError) -> Self {
        SessionError::Identity {
            location: ErrorLocation::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn connect(source: BackendError) -> Self {
        SessionError::Connect {
            location: ErrorLocation::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn reachability(source: BackendError) -> Self {
        SessionError::Reachability {
            location: ErrorLocation::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn send(recipient: impl Into<String>, source: BackendError) -> Self {
        SessionError::Send {
            recipient: recipient.into(),
            location: ErrorLocation::caller(),
            source,
        }
    }

    #[track_caller]
    pub fn pairing_stream(message: impl Into<String>) -> Self {
        SessionError::PairingStream {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn pairing_timeout(timeout: Duration) -> Self {
        SessionError::PairingTimeout {
            timeout,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        SessionError::Unavailable {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    /// Human readable message attached to a `LibraryError` report.
    pub fn message(&self) -> String {
        match self {
            SessionError::Store { source, .. } => {
                format!("Session store failure: {}", source.message())
            }
            SessionError::Identity { source, .. } => {
                format!("Unable to read device identity: {}", source.message())
            }
            SessionError::Connect { source, .. } => {
                format!("Failed to connect: {}", source.message())
            }
            SessionError::Reachability { source, .. } => {
                format!("Reachability check failed: {}", source.message())
            }
            SessionError::Send { source, .. } => {
                format!("Message submission failed: {}", source.message())
            }
            SessionError::PairingStream { message, .. } => message.clone(),
            SessionError::PairingTimeout { timeout, .. } => {
                format!("Timed out after {timeout:?} waiting for pairing code")
            }
            SessionError::Unavailable { message, .. } => message.clone(),
        }
    }

    /// Short category name for log lines.
    pub fn error_category(&self) -> &'static str {
        match self {
            SessionError::Store { .. } => "store",
            SessionError::Identity { .. } => "identity",
            SessionError::Connect { .. } => "connect",
            SessionError::Reachability { .. } => "reachability",
            SessionError::Send { .. } => "send",
            SessionError::PairingStream { .. } => "pairing_stream",
            SessionError::PairingTimeout { .. } => "pairing_timeout",
            SessionError::Unavailable { .. } => "unavailable",
        }
    }
}
