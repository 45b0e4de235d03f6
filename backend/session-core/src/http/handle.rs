//! HTTP server handle type.

use crate::error::server::ServerError;

use common::ErrorLocation;

use std::io::Error as IoError;
use std::net::SocketAddr;

use log::{info, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running HTTP server.
///
/// Returned by [`start_http_server`](crate::http::start_http_server). Dropping
/// the handle without calling [`shutdown`](Self::shutdown) leaves the server
/// running until the process exits.
pub struct HttpServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<(), IoError>>,
}

impl HttpServerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<Result<(), IoError>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown_tx,
            task,
        }
    }

    /// Address actually bound; differs from the requested one when port 0 was used.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if the server task failed or panicked.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        info!("Stopping HTTP server on {}", self.local_addr);

        if self.shutdown_tx.send(()).is_err() {
            warn!("HTTP server already stopped before shutdown was requested");
        }

        match self.task.await {
            Ok(Ok(())) => {
                info!("HTTP server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(ServerError::Serve {
                message: format!("HTTP server failed: {e}"),
                location: ErrorLocation::caller(),
            }),
            Err(e) => Err(ServerError::Serve {
                message: format!("HTTP server task failed: {e}"),
                location: ErrorLocation::caller(),
            }),
        }
    }
}
