//! The session actor and the state it owns.

use super::pairing;
use super::{ActiveClient, PairingMode, SessionCommand, probe};
use crate::backend::{ClientConnector, ProtocolClient, SessionStore};
use crate::error::SessionError;
use crate::status::{
    ConnectionStatus, NOT_SIGNED_IN_MESSAGE, StatusReport, TARGET_NOT_ON_NETWORK_MESSAGE,
};

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc;

pub(crate) struct Session {
    store: Arc<dyn SessionStore>,
    connector: Arc<dyn ClientConnector>,
    active_client: ActiveClient,
    pairing_timeout: Duration,
}

/// Processes commands until shutdown or until every controller handle is dropped.
pub(crate) async fn session_actor(
    mut command_rx: mpsc::Receiver<SessionCommand>,
    session: Session,
) {
    info!("Session actor started");

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            SessionCommand::Restore { reply } => {
                let _ = reply.send(session.restore().await);
            }
            SessionCommand::StartPairing { mode, reply } => {
                let _ = reply.send(session.start_pairing(mode).await);
            }
            SessionCommand::SendMessage {
                phone_number,
                text,
                reply,
            } => {
                let _ = reply.send(session.send_message(&phone_number, &text).await);
            }
            SessionCommand::Shutdown { reply } => {
                let result = session.shutdown().await;
                // Closed before replying so callers never see a half-open channel.
                command_rx.close();
                let _ = reply.send(result);
                info!("Session actor stopped after shutdown");
                return;
            }
        }
    }

    warn!("Session actor stopped - all controller handles dropped without shutdown");
}

impl Session {
    pub(crate) fn new(
        store: Arc<dyn SessionStore>,
        connector: Arc<dyn ClientConnector>,
        active_client: ActiveClient,
        pairing_timeout: Duration,
    ) -> Self {
        Self {
            store,
            connector,
            active_client,
            pairing_timeout,
        }
    }

    async fn restore(&self) -> StatusReport {
        match self.try_restore().await {
            Ok(report) => {
                info!("Session restore finished: {}", report.status);
                report
            }
            Err(e) => {
                error!("Session restore failed ({}): {e}", e.error_category());
                e.into()
            }
        }
    }

    async fn try_restore(&self) -> Result<StatusReport, SessionError> {
        let device = self
            .store
            .first_device()
            .await
            .map_err(|e| SessionError::store(e))?;

        if !device.is_linked() {
            info!("No linked device stored");
            return Ok(StatusReport::new(ConnectionStatus::SignedOut));
        }

        let client = self.connector.new_client(device);
        if let Err(e) = client.connect().await {
            let failure = SessionError::connect(e);
            warn!("Stored device could not connect: {failure}");
            client.disconnect().await;
            return Ok(StatusReport::with_message(
                ConnectionStatus::NotConnected,
                failure.message(),
            ));
        }

        let previous = self.active_client.write().await.replace(client);
        if let Some(previous) = previous {
            previous.disconnect().await;
        }

        Ok(StatusReport::new(ConnectionStatus::SignedIn))
    }

    async fn start_pairing(&self, mode: PairingMode) -> StatusReport {
        if mode == PairingMode::KeepExisting {
            let current = probe(self.active_client.read().await.as_deref());
            if current.status == ConnectionStatus::SignedIn {
                info!("Already signed in, keeping existing session");
                return current;
            }
        }

        match self.relink().await {
            Ok(report) => {
                info!("Pairing request finished: {}", report.status);
                report
            }
            Err(e) => {
                error!("Pairing failed ({}): {e}", e.error_category());
                e.into()
            }
        }
    }

    /// Destructive reset followed by a fresh pairing attempt.
    async fn relink(&self) -> Result<StatusReport, SessionError> {
        let devices = self
            .store
            .list_devices()
            .await
            .map_err(|e| SessionError::store(e))?;

        for device in &devices {
            self.store
                .delete_device(device)
                .await
                .map_err(|e| SessionError::store(e))?;
        }
        info!("Cleared {} stored device(s) before pairing", devices.len());

        let previous = self.active_client.write().await.take();
        if let Some(previous) = previous {
            info!("Disconnecting previous client");
            previous.disconnect().await;
        }

        let device = self
            .store
            .first_device()
            .await
            .map_err(|e| SessionError::store(e))?;
        let client = self.connector.new_client(device);

        if client
            .linked_id()
            .map_err(|e| SessionError::identity(e))?
            .is_some()
        {
            warn!("Fresh identity slot is already linked, skipping pairing");
            return Ok(StatusReport::new(ConnectionStatus::SignedIn));
        }

        match pairing::obtain_code(&client, self.pairing_timeout).await {
            Ok(code) => {
                *self.active_client.write().await = Some(client);
                Ok(StatusReport::pairing_code(code))
            }
            Err(e) => {
                client.disconnect().await;
                Err(e)
            }
        }
    }

    async fn send_message(&self, phone_number: &str, text: &str) -> StatusReport {
        let client = match self.signed_in_client().await {
            Ok(client) => client,
            Err(report) => {
                info!("Send refused: session is {}", report.status);
                return report;
            }
        };

        match deliver(client.as_ref(), phone_number, text).await {
            Ok(report) => report,
            Err(e) => {
                error!("Send failed ({}): {e}", e.error_category());
                e.into()
            }
        }
    }

    /// The active client, if and only if the session is signed in.
    async fn signed_in_client(&self) -> Result<Arc<dyn ProtocolClient>, StatusReport> {
        let client = self.active_client.read().await.clone();
        let report = probe(client.as_deref());

        match (report.status, client) {
            (ConnectionStatus::SignedIn, Some(client)) => Ok(client),
            (ConnectionStatus::LibraryError, _) => Err(report),
            (status, _) => Err(StatusReport::with_message(status, NOT_SIGNED_IN_MESSAGE)),
        }
    }

    async fn shutdown(&self) -> Result<(), SessionError> {
        let previous = self.active_client.write().await.take();
        if let Some(previous) = previous {
            previous.disconnect().await;
        }

        self.store
            .close()
            .await
            .map_err(|e| SessionError::store(e))?;
        info!("Session shut down, store released");
        Ok(())
    }
}

async fn deliver(
    client: &dyn ProtocolClient,
    phone_number: &str,
    text: &str,
) -> Result<StatusReport, SessionError> {
    let recipients = client
        .lookup_recipients(phone_number)
        .await
        .map_err(|e| SessionError::reachability(e))?;

    if recipients.is_empty() {
        info!("Target is not on the network");
        return Ok(StatusReport::with_message(
            ConnectionStatus::TargetNotOnNetwork,
            TARGET_NOT_ON_NETWORK_MESSAGE,
        ));
    }

    for recipient in &recipients {
        client
            .send_text(recipient, text)
            .await
            .map_err(|e| SessionError::send(recipient.address.as_str(), e))?;
    }

    info!("Message sent to {} recipient(s)", recipients.len());
    Ok(StatusReport::new(ConnectionStatus::MessageSent))
}
