//! Errors raised by the collaborators behind the session controller.
//!
//! The session store and the protocol client report failures through this
//! type. The controller wraps them into [`SessionError`](super::SessionError)
//! with the operation that failed.

use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("Store Error: {message} {location}")]
    Store {
        message: String,
        location: ErrorLocation,
    },

    #[error("Store Closed Error: session store is closed {location}")]
    StoreClosed { location: ErrorLocation },

    #[error("Network Error: {message} {location}")]
    Network {
        message: String,
        location: ErrorLocation,
    },

    #[error("Rejected Error: {message} {location}")]
    Rejected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },
}

impl BackendError {
    #[track_caller]
    pub fn store(message: impl Into<String>) -> Self {
        BackendError::Store {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn store_closed() -> Self {
        BackendError::StoreClosed {
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        BackendError::Network {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn rejected(message: impl Into<String>) -> Self {
        BackendError::Rejected {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn not_connected(message: impl Into<String>) -> Self {
        BackendError::NotConnected {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    /// Message without the source location, safe to hand to callers.
    pub fn message(&self) -> String {
        match self {
            BackendError::Store { message, .. }
            | BackendError::Network { message, .. }
            | BackendError::Rejected { message, .. }
            | BackendError::NotConnected { message, .. } => message.clone(),
            BackendError::StoreClosed { .. } => String::from("session store is closed"),
        }
    }
}

impl From<IoError> for BackendError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        BackendError::Store {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        BackendError::Store {
            message: format!("Corrupt store file: {error}"),
            location: ErrorLocation::caller(),
        }
    }
}
