//! Wiring of the running bridge: store, loopback network, controller, HTTP adapter.

use crate::error::BridgeError;

use session_core::backend::{FileSessionStore, LoopbackConnector, LoopbackNetwork};
use session_core::config::{BridgeConfig, BridgePaths};
use session_core::http::{HttpServerHandle, start_http_server};
use session_core::{SessionController, StatusReport};

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};

/// A started bridge. Stop it with [`shutdown`](Self::shutdown).
pub struct Bridge {
    controller: SessionController,
    server: HttpServerHandle,
    restored: StatusReport,
}

impl Bridge {
    /// Open the session store, restore any linked device and start serving HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store cannot be opened,
    /// [`BridgeError::Config`] if the bind address is invalid, or
    /// [`BridgeError::Server`] if the address cannot be bound.
    pub async fn start(config: &BridgeConfig, paths: &BridgePaths) -> Result<Self, BridgeError> {
        // Resolved before anything holds the store.
        let address = config.socket_addr()?;

        let store_path = paths.store_file(config.session.store_file.as_deref());
        let store = Arc::new(FileSessionStore::open(&store_path).await?);
        info!("Session store: {}", store.path().display());

        let network = Arc::new(LoopbackNetwork::new(
            store.clone(),
            config.loopback.registered_numbers.iter().cloned(),
            config.scan_delay(),
        ));
        info!(
            "Loopback network ready ({} registered number(s))",
            config.loopback.registered_numbers.len()
        );

        let controller = SessionController::spawn(
            store,
            Arc::new(LoopbackConnector::new(network)),
            config.controller_settings(),
        );

        let restored = controller.restore().await;
        if restored.is_error() {
            error!(
                "Session restore failed: {}",
                restored.error_message.as_deref().unwrap_or("unknown error")
            );
        } else {
            info!("Session restore: {}", restored.status);
        }

        let server =
            match start_http_server(address, controller.clone(), config.default_pairing_mode())
                .await
            {
                Ok(server) => server,
                Err(e) => {
                    // Release the store before reporting the bind failure.
                    if let Err(shutdown_error) = controller.shutdown().await {
                        warn!("Controller shutdown after failed start: {shutdown_error}");
                    }
                    return Err(e.into());
                }
            };

        Ok(Self {
            controller,
            server,
            restored,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Outcome of the startup restore.
    pub fn restored(&self) -> &StatusReport {
        &self.restored
    }

    /// Stop the HTTP listener, then disconnect the client and close the store.
    ///
    /// The controller is shut down even if the listener fails to stop.
    pub async fn shutdown(self) -> Result<(), BridgeError> {
        let server_result = self.server.shutdown().await;
        let controller_result = self.controller.shutdown().await;

        server_result?;
        controller_result?;
        info!("Bridge stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
