//! The external status vocabulary.
//!
//! Every controller operation answers with exactly one [`ConnectionStatus`],
//! optionally accompanied by a pairing code or an error message. Callers
//! branch on the status, never on a separate error flag.

use crate::error::SessionError;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message attached when a send is refused because the session is not ready.
pub const NOT_SIGNED_IN_MESSAGE: &str = "Not signed in and connected";

/// Message attached when the reachability check resolves no recipients.
pub const TARGET_NOT_ON_NETWORK_MESSAGE: &str = "Target is not on the network";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    SignedIn,
    SignedOut,
    NotConnected,
    #[serde(rename = "qr_code_generated")]
    QRCodeGenerated,
    MessageSent,
    TargetNotOnNetwork,
    LibraryError,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::SignedIn => "signed_in",
            ConnectionStatus::SignedOut => "signed_out",
            ConnectionStatus::NotConnected => "not_connected",
            ConnectionStatus::QRCodeGenerated => "qr_code_generated",
            ConnectionStatus::MessageSent => "message_sent",
            ConnectionStatus::TargetNotOnNetwork => "target_not_on_network",
            ConnectionStatus::LibraryError => "library_error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one controller operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusReport {
    pub fn new(status: ConnectionStatus) -> Self {
        Self {
            status,
            code: None,
            error_message: None,
        }
    }

    pub fn with_message(status: ConnectionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            error_message: Some(message.into()),
        }
    }

    pub fn pairing_code(code: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::QRCodeGenerated,
            code: Some(code.into()),
            error_message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ConnectionStatus::LibraryError
    }
}

impl From<SessionError> for StatusReport {
    fn from(error: SessionError) -> Self {
        StatusReport::with_message(ConnectionStatus::LibraryError, error.message())
    }
}

impl From<Result<StatusReport, SessionError>> for StatusReport {
    fn from(result: Result<StatusReport, SessionError>) -> Self {
        result.unwrap_or_else(StatusReport::from)
    }
}
