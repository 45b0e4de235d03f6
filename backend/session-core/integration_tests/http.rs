use crate::helpers::{REGISTERED_NUMBER, TestBridge};

use session_core::http::MALFORMED_SEND_BODY_MESSAGE;

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// Public API tests for the HTTP adapter
// Every request goes through a real socket to a loopback-backed controller
// ============================================================================

#[tokio::test]
async fn given_fresh_bridge_when_get_info_then_200_signed_out() {
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;

    let (status, body) = bridge.get("/info").await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "signed_out" }));
    bridge.stop().await;
}

/// **VALUE**: Malformed send bodies are rejected by the adapter.
///
/// **WHY THIS MATTERS**: Callers get one stable error message for every shape
/// of bad input, and the controller never sees an incomplete request.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Invalid JSON leaks axum's plain-text rejection instead of the JSON body
/// - Missing or empty fields reach the controller
#[tokio::test]
async fn given_malformed_body_when_post_send_message_then_400_with_fixed_message() {
    // GIVEN: A running bridge
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;
    let expected = json!({ "error_message": MALFORMED_SEND_BODY_MESSAGE });

    // WHEN: Posting bodies that are not valid send requests
    let not_json = bridge
        .client
        .post(bridge.url("/send_message"))
        .header("content-type", "application/json")
        .body("{ nope")
        .send()
        .await
        .unwrap();
    let not_json_status = not_json.status().as_u16();
    let not_json_body: serde_json::Value = not_json.json().await.unwrap();

    let (missing_status, missing_body) = bridge
        .post_json("/send_message", &json!({ "phone_number": REGISTERED_NUMBER }))
        .await;
    let (empty_status, empty_body) = bridge
        .post_json(
            "/send_message",
            &json!({ "phone_number": "", "message": "hi" }),
        )
        .await;

    // THEN: Every one is a 400 with the fixed message and nothing was sent
    assert_eq!(not_json_status, 400);
    assert_eq!(not_json_body, expected);
    assert_eq!(missing_status, 400);
    assert_eq!(missing_body, expected);
    assert_eq!(empty_status, 400);
    assert_eq!(empty_body, expected);
    assert!(bridge.network.sent_messages().await.is_empty());
    bridge.stop().await;
}

#[tokio::test]
async fn given_not_signed_in_when_post_send_message_then_400_signed_out() {
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;

    let (status, body) = bridge
        .post_json(
            "/send_message",
            &json!({ "phone_number": REGISTERED_NUMBER, "message": "hi" }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(
        body,
        json!({ "status": "signed_out", "error_message": "Not signed in and connected" })
    );
    bridge.stop().await;
}

#[tokio::test]
async fn given_no_session_when_post_start_connection_then_202_with_code() {
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;

    let (status, body) = bridge.post_empty("/start_connection").await;

    assert_eq!(status, 202);
    assert_eq!(body["status"], "qr_code_generated");
    assert!(
        body["code"].as_str().is_some_and(|code| code.starts_with("2@")),
        "unexpected body {body}"
    );
    bridge.stop().await;
}

#[tokio::test]
async fn given_invalid_force_parameter_when_post_start_connection_then_400() {
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;

    let (status, body) = bridge.post_empty("/start_connection?force=maybe").await;

    assert_eq!(status, 400);
    assert!(body["error_message"].is_string());
    bridge.stop().await;
}

/// **VALUE**: The whole flow a user goes through, over HTTP.
///
/// **WHY THIS MATTERS**: Exercises pairing, the simulated scan, status
/// polling, both send outcomes and the keep-existing relink policy together.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The paired client is not kept as the active client
/// - Status codes for send outcomes drift from the table
/// - `force=false` relinks anyway
#[tokio::test]
async fn given_scanned_pairing_when_sending_then_201_and_409_by_reachability() {
    // GIVEN: A bridge whose simulated phone scans 50ms after the code is issued
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(
        &dir.path().join("session.json"),
        Some(Duration::from_millis(50)),
    )
    .await;

    let (status, _) = bridge.post_empty("/start_connection").await;
    assert_eq!(status, 202);
    bridge.wait_signed_in().await;
    let (status, body) = bridge.get("/info").await;
    assert_eq!((status, body), (200, json!({ "status": "signed_in" })));

    // WHEN: Sending to a registered and an unregistered number
    let (sent_status, sent_body) = bridge
        .post_json(
            "/send_message",
            &json!({ "phone_number": REGISTERED_NUMBER, "message": "hi" }),
        )
        .await;
    let (missing_status, missing_body) = bridge
        .post_json(
            "/send_message",
            &json!({ "phone_number": "+15550000000", "message": "hi" }),
        )
        .await;

    // THEN: 201 for the registered number, 409 for the other
    assert_eq!(sent_status, 201);
    assert_eq!(sent_body, json!({ "status": "message_sent" }));
    assert_eq!(missing_status, 409);
    assert_eq!(
        missing_body,
        json!({ "status": "target_not_on_network", "error_message": "Target is not on the network" })
    );
    assert_eq!(bridge.network.sent_messages().await.len(), 1);

    // AND: Asking to pair without force keeps the session
    let (status, body) = bridge.post_empty("/start_connection?force=false").await;
    assert_eq!((status, body), (200, json!({ "status": "signed_in" })));
    bridge.stop().await;
}

#[tokio::test]
async fn given_server_shut_down_when_requesting_then_connection_fails() {
    let dir = TempDir::new().unwrap();
    let bridge = TestBridge::start(&dir.path().join("session.json"), None).await;
    let url = bridge.url("/info");
    let client = bridge.client.clone();

    bridge.stop().await;

    assert!(client.get(url).send().await.is_err());
}
