//! Session controller: one messaging session's lifecycle.
//!
//! # Architecture
//!
//! Uses the same actor layout as the rest of the crate's shared state:
//! - Mutating operations (`restore`, `start_pairing`, `send_message`,
//!   `shutdown`) are sent as [`SessionCommand`]s over an mpsc channel
//! - A dedicated task owns the collaborators and processes commands one at a time
//! - `check_status` reads the active client slot through an `RwLock`
//!   snapshot and never queues behind the actor
//!
//! A pairing in progress therefore blocks sends and other pairings, but not
//! status probes.

mod actor;
mod pairing;

use crate::backend::{ClientConnector, ProtocolClient, SessionStore};
use crate::error::SessionError;
use crate::status::{ConnectionStatus, StatusReport};

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::{RwLock, mpsc, oneshot};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const DEFAULT_PAIRING_TIMEOUT: Duration = Duration::from_secs(60);
const SHUT_DOWN_MESSAGE: &str = "Session controller is shut down";

/// The active client slot, shared between the actor and status probes.
pub(crate) type ActiveClient = Arc<RwLock<Option<Arc<dyn ProtocolClient>>>>;

/// What `start_pairing` does when the session is already signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingMode {
    /// Delete stored credentials, drop the current client and pair again.
    ForceRelink,
    /// Report `SignedIn` and leave the existing session untouched.
    KeepExisting,
}

impl PairingMode {
    pub fn from_force(force: bool) -> Self {
        if force {
            PairingMode::ForceRelink
        } else {
            PairingMode::KeepExisting
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Upper bound on waiting for the first pairing code.
    pub pairing_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            pairing_timeout: DEFAULT_PAIRING_TIMEOUT,
        }
    }
}

/// Commands processed by the session actor.
pub(crate) enum SessionCommand {
    Restore {
        reply: oneshot::Sender<StatusReport>,
    },
    StartPairing {
        mode: PairingMode,
        reply: oneshot::Sender<StatusReport>,
    },
    SendMessage {
        phone_number: String,
        text: String,
        reply: oneshot::Sender<StatusReport>,
    },
    Shutdown {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
}

/// Handle to the session. Cheap to clone; every clone talks to the same actor.
#[derive(Clone)]
pub struct SessionController {
    command_tx: mpsc::Sender<SessionCommand>,
    active_client: ActiveClient,
}

impl SessionController {
    /// Spawn the session actor on the current tokio runtime.
    ///
    /// The controller owns `store` from here on; it is closed by
    /// [`shutdown`](Self::shutdown).
    pub fn spawn(
        store: Arc<dyn SessionStore>,
        connector: Arc<dyn ClientConnector>,
        settings: ControllerSettings,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let active_client: ActiveClient = Arc::new(RwLock::new(None));

        let session = actor::Session::new(
            store,
            connector,
            Arc::clone(&active_client),
            settings.pairing_timeout,
        );
        tokio::spawn(actor::session_actor(command_rx, session));
        info!(
            "Session controller started (pairing timeout {:?})",
            settings.pairing_timeout
        );

        Self {
            command_tx,
            active_client,
        }
    }

    /// Current sign-in state. Read-only; runs concurrently with itself.
    pub async fn check_status(&self) -> StatusReport {
        let snapshot = self.active_client.read().await;
        probe(snapshot.as_deref())
    }

    /// Reconnect a previously linked device from the store.
    pub async fn restore(&self) -> StatusReport {
        self.request(|reply| SessionCommand::Restore { reply }).await
    }

    /// Start linking a new device and return the first pairing code.
    pub async fn start_pairing(&self, mode: PairingMode) -> StatusReport {
        self.request(|reply| SessionCommand::StartPairing { mode, reply })
            .await
    }

    /// Send `text` to every account registered for `phone_number`.
    pub async fn send_message(
        &self,
        phone_number: impl Into<String>,
        text: impl Into<String>,
    ) -> StatusReport {
        let phone_number = phone_number.into();
        let text = text.into();
        self.request(|reply| SessionCommand::SendMessage {
            phone_number,
            text,
            reply,
        })
        .await
    }

    /// Disconnect the active client and close the session store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store could not be flushed, or
    /// [`SessionError::Unavailable`] if the controller was already shut down.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();

        self.command_tx
            .send(SessionCommand::Shutdown { reply })
            .await
            .map_err(|_| SessionError::unavailable(SHUT_DOWN_MESSAGE))?;

        response
            .await
            .map_err(|_| SessionError::unavailable(SHUT_DOWN_MESSAGE))?
    }

    async fn request(
        &self,
        build: impl FnOnce(oneshot::Sender<StatusReport>) -> SessionCommand,
    ) -> StatusReport {
        let (reply, response) = oneshot::channel();

        if self.command_tx.send(build(reply)).await.is_err() {
            warn!("Session command rejected: actor is gone");
            return SessionError::unavailable(SHUT_DOWN_MESSAGE).into();
        }

        match response.await {
            Ok(report) => report,
            Err(_) => SessionError::unavailable("Session actor dropped the request").into(),
        }
    }
}

/// Maps the active client's state onto the status vocabulary.
pub(crate) fn probe(client: Option<&dyn ProtocolClient>) -> StatusReport {
    let Some(client) = client else {
        return StatusReport::new(ConnectionStatus::SignedOut);
    };

    if !client.is_connected() {
        return StatusReport::new(ConnectionStatus::NotConnected);
    }

    match client.linked_id() {
        Ok(Some(_)) => StatusReport::new(ConnectionStatus::SignedIn),
        Ok(None) => StatusReport::new(ConnectionStatus::SignedOut),
        Err(e) => SessionError::identity(e).into(),
    }
}
