// Unit tests for bridge startup and shutdown wiring

use crate::error::BridgeError;
use crate::startup::Bridge;

use session_core::config::{BridgeConfig, BridgePaths};
use session_core::{ConnectionStatus, PairingMode};

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

fn paths_in(dir: &TempDir) -> BridgePaths {
    BridgePaths::resolve(
        |_| None,
        Some(dir.path().join("config")),
        Some(dir.path().join("data")),
    )
    .unwrap()
}

fn ephemeral_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.server.port = 0;
    config
}

#[tokio::test]
async fn given_empty_data_dir_when_started_then_serving_and_signed_out() {
    let dir = TempDir::new().unwrap();

    let bridge = Bridge::start(&ephemeral_config(), &paths_in(&dir))
        .await
        .expect("Bridge should start");

    assert_ne!(bridge.local_addr().port(), 0);
    assert_eq!(bridge.restored().status, ConnectionStatus::SignedOut);
    assert_eq!(
        bridge.controller().check_status().await.status,
        ConnectionStatus::SignedOut
    );
    bridge.shutdown().await.expect("Bridge should stop");
}

/// **VALUE**: A session linked in one run is restored by the next.
///
/// **WHY THIS MATTERS**: This is the startup path the binary takes after every
/// restart; pairing again each time would make the bridge unusable.
///
/// **BUG THIS CATCHES**: Would catch if startup skipped `restore` or opened a
/// different store file than the previous run wrote.
#[tokio::test]
async fn given_linked_session_when_restarted_then_restored_signed_in() {
    // GIVEN: A first run that pairs via the simulated scan
    let dir = TempDir::new().unwrap();
    let paths = paths_in(&dir);
    let mut config = ephemeral_config();
    config.loopback.scan_delay_ms = Some(20);

    let first = Bridge::start(&config, &paths).await.unwrap();
    let pairing = first
        .controller()
        .start_pairing(PairingMode::ForceRelink)
        .await;
    assert_eq!(pairing.status, ConnectionStatus::QRCodeGenerated);
    let mut signed_in = false;
    for _ in 0..100 {
        if first.controller().check_status().await.status == ConnectionStatus::SignedIn {
            signed_in = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(signed_in, "simulated scan never completed");
    first.shutdown().await.unwrap();

    // WHEN: Starting again on the same data directory
    let second = Bridge::start(&config, &paths).await.unwrap();

    // THEN: The session is restored at startup
    assert_eq!(second.restored().status, ConnectionStatus::SignedIn);
    assert!(paths.store_file(None).exists());
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn given_port_in_use_when_started_then_server_error() {
    let dir = TempDir::new().unwrap();
    let first = Bridge::start(&ephemeral_config(), &paths_in(&dir))
        .await
        .unwrap();
    let mut config = ephemeral_config();
    config.server.port = first.local_addr().port();
    config.session.store_file = Some(dir.path().join("other.json"));

    let result = Bridge::start(&config, &paths_in(&dir)).await;

    assert!(matches!(result, Err(BridgeError::Server { .. })));
    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn given_corrupt_store_file_when_started_then_store_error() {
    let dir = TempDir::new().unwrap();
    let store_file: PathBuf = dir.path().join("session.json");
    std::fs::write(&store_file, "not json").unwrap();
    let mut config = ephemeral_config();
    config.session.store_file = Some(store_file);

    let result = Bridge::start(&config, &paths_in(&dir)).await;

    assert!(matches!(result, Err(BridgeError::Store { .. })));
}

/// **VALUE**: An invalid bind host is rejected before the store is touched.
///
/// **BUG THIS CATCHES**: Resolving the address after the controller is spawned,
/// which returns early with the store still open.
#[tokio::test]
async fn given_invalid_host_when_started_then_config_error_and_store_untouched() {
    // GIVEN: A config with an unparsable host and a store in a fresh directory
    let dir = TempDir::new().unwrap();
    let store_dir = dir.path().join("store");
    let mut config = ephemeral_config();
    config.server.host = "not-an-address".to_string();
    config.session.store_file = Some(store_dir.join("session.json"));

    // WHEN: Starting the bridge
    let result = Bridge::start(&config, &paths_in(&dir)).await;

    // THEN: Config error and the store was never opened
    assert!(matches!(result, Err(BridgeError::Config { .. })));
    assert!(!store_dir.exists());
}
