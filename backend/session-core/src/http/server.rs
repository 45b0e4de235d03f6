use crate::controller::{PairingMode, SessionController};
use crate::error::server::ServerError;
use crate::http::handle::HttpServerHandle;
use crate::http::routes::{self, AppState};

use common::ErrorLocation;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Router with every route bound to `controller`.
pub fn build_router(controller: SessionController, default_pairing_mode: PairingMode) -> Router {
    let state = AppState {
        controller,
        default_pairing_mode,
    };

    Router::new()
        .route("/info", get(routes::info))
        .route("/send_message", post(routes::send_message))
        .route("/start_connection", post(routes::start_connection))
        .with_state(state)
}

/// Binds `address` and serves the adapter on a background task.
///
/// Port 0 binds an ephemeral port; read it back with
/// [`HttpServerHandle::local_addr`].
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is in use or not permitted.
pub async fn start_http_server(
    address: SocketAddr,
    controller: SessionController,
    default_pairing_mode: PairingMode,
) -> Result<HttpServerHandle, ServerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| ServerError::Bind {
            address,
            location: ErrorLocation::caller(),
            source: e,
        })?;
    let local_addr = listener.local_addr()?;

    let router = build_router(controller, default_pairing_mode);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;

        if let Err(e) = &result {
            error!("HTTP server terminated: {e}");
        }
        result
    });

    info!("HTTP server listening on {local_addr}");
    Ok(HttpServerHandle::new(local_addr, shutdown_tx, task))
}
