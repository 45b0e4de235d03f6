//! Test helpers for integration tests.
//!
//! Builds a complete bridge (file store, loopback network, controller, HTTP
//! server on an ephemeral port) inside a temp directory.

use session_core::backend::{FileSessionStore, LoopbackConnector, LoopbackNetwork};
use session_core::http::{HttpServerHandle, start_http_server};
use session_core::{ConnectionStatus, ControllerSettings, PairingMode, SessionController};

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

pub const REGISTERED_NUMBER: &str = "+15551234567";

/// A running bridge and the pieces tests inspect.
pub struct TestBridge {
    pub controller: SessionController,
    pub network: Arc<LoopbackNetwork>,
    pub server: HttpServerHandle,
    pub client: reqwest::Client,
}

impl TestBridge {
    pub async fn start(store_path: &Path, scan_delay: Option<Duration>) -> Self {
        let store = Arc::new(
            FileSessionStore::open(store_path)
                .await
                .expect("Failed to open session store"),
        );
        let network = Arc::new(LoopbackNetwork::new(
            store.clone(),
            [REGISTERED_NUMBER.to_string()],
            scan_delay,
        ));
        let connector = Arc::new(LoopbackConnector::new(network.clone()));
        let controller = SessionController::spawn(
            store,
            connector,
            ControllerSettings {
                pairing_timeout: Duration::from_secs(5),
            },
        );

        let address: SocketAddr = "127.0.0.1:0".parse().expect("valid address");
        let server = start_http_server(address, controller.clone(), PairingMode::ForceRelink)
            .await
            .expect("Failed to start HTTP server");

        Self {
            controller,
            network,
            server,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.server.local_addr(), path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        decode(response).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed");
        decode(response).await
    }

    pub async fn post_empty(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("POST failed");
        decode(response).await
    }

    /// Polls `check_status` until it reports `SignedIn`.
    pub async fn wait_signed_in(&self) {
        for _ in 0..100 {
            if self.controller.check_status().await.status == ConnectionStatus::SignedIn {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Session never reached signed_in");
    }

    pub async fn stop(self) {
        self.server.shutdown().await.expect("HTTP shutdown failed");
        self.controller
            .shutdown()
            .await
            .expect("Controller shutdown failed");
    }
}

async fn decode(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.expect("Body was not JSON");
    (status, body)
}
