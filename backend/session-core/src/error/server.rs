use common::ErrorLocation;

use std::io::Error as IoError;
use std::net::SocketAddr;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ServerError {
    #[error("Bind Error: {address}: {source} {location}")]
    Bind {
        address: SocketAddr,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Serve Error: {message} {location}")]
    Serve {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for ServerError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        ServerError::Io {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
