use crate::helpers::TestBridge;

use session_core::backend::{FileSessionStore, LoopbackConnector, LoopbackNetwork};
use session_core::{
    ConnectionStatus, ControllerSettings, PairingMode, SessionController, StatusReport,
};

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

/// **VALUE**: A linked device survives a restart.
///
/// **WHY THIS MATTERS**: Users pair once. After a restart `restore` must bring
/// the session back from the store file without a new QR code.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The store is not flushed on shutdown
/// - The linked id is not persisted with the device
/// - `restore` ignores the stored device
#[tokio::test]
async fn given_paired_session_when_restarted_then_restore_signs_in() {
    // GIVEN: A session paired through the loopback network, then shut down
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("session.json");
    let bridge = TestBridge::start(&store_path, Some(Duration::from_millis(20))).await;
    let pairing = bridge.controller.start_pairing(PairingMode::ForceRelink).await;
    assert_eq!(pairing.status, ConnectionStatus::QRCodeGenerated);
    bridge.wait_signed_in().await;
    bridge.stop().await;

    // WHEN: A new controller restores from the same file
    let store = Arc::new(FileSessionStore::open(&store_path).await.unwrap());
    let network = Arc::new(LoopbackNetwork::new(store.clone(), Vec::new(), None));
    let controller = SessionController::spawn(
        store,
        Arc::new(LoopbackConnector::new(network)),
        ControllerSettings::default(),
    );
    let report = controller.restore().await;

    // THEN: Signed in without pairing again
    assert_eq!(report, StatusReport::new(ConnectionStatus::SignedIn));
    assert_eq!(
        controller.check_status().await.status,
        ConnectionStatus::SignedIn
    );
    controller.shutdown().await.unwrap();
}

#[tokio::test]
async fn given_relink_when_restarted_then_previous_device_gone() {
    // GIVEN: A paired session that is then relinked without a scan
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("session.json");
    let bridge = TestBridge::start(&store_path, Some(Duration::from_millis(20))).await;
    bridge.controller.start_pairing(PairingMode::ForceRelink).await;
    bridge.wait_signed_in().await;
    bridge.stop().await;

    let bridge = TestBridge::start(&store_path, None).await;
    assert_eq!(
        bridge.controller.restore().await.status,
        ConnectionStatus::SignedIn
    );
    let relink = bridge.controller.start_pairing(PairingMode::ForceRelink).await;
    assert_eq!(relink.status, ConnectionStatus::QRCodeGenerated);
    bridge.stop().await;

    // WHEN: Restoring again
    let bridge = TestBridge::start(&store_path, None).await;
    let report = bridge.controller.restore().await;

    // THEN: The wiped device is not restored
    assert_eq!(report, StatusReport::new(ConnectionStatus::SignedOut));
    bridge.stop().await;
}
