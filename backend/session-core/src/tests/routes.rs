// Unit tests for the status to HTTP code table.
// Full request/response round-trips are in integration_tests/http.rs

use crate::http::{Operation, status_code};
use crate::status::ConnectionStatus;

use common::HttpStatusCode;

/// **VALUE**: `LibraryError` is a server error no matter which route produced it.
#[test]
fn given_library_error_when_mapped_then_500_for_every_operation() {
    for operation in [
        Operation::GetStatus,
        Operation::SendMessage,
        Operation::StartPairing,
    ] {
        assert_eq!(
            status_code(operation, ConnectionStatus::LibraryError),
            HttpStatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

#[test]
fn given_any_non_error_status_when_get_status_then_200() {
    for status in [
        ConnectionStatus::SignedIn,
        ConnectionStatus::SignedOut,
        ConnectionStatus::NotConnected,
    ] {
        assert_eq!(
            status_code(Operation::GetStatus, status),
            HttpStatusCode::OK
        );
    }
}

/// **VALUE**: Pins the send outcomes callers rely on.
///
/// **BUG THIS CATCHES**: Mapping `TargetNotOnNetwork` to a 5xx would make
/// clients retry a send that can never succeed.
#[test]
fn given_send_outcomes_when_mapped_then_match_table() {
    let cases = [
        (ConnectionStatus::MessageSent, HttpStatusCode::CREATED),
        (ConnectionStatus::SignedOut, HttpStatusCode::BAD_REQUEST),
        (
            ConnectionStatus::NotConnected,
            HttpStatusCode::INTERNAL_SERVER_ERROR,
        ),
        (ConnectionStatus::TargetNotOnNetwork, HttpStatusCode::CONFLICT),
    ];

    for (status, expected) in cases {
        assert_eq!(status_code(Operation::SendMessage, status), expected);
    }
}

#[test]
fn given_pairing_outcomes_when_mapped_then_202_for_code_and_200_for_signed_in() {
    assert_eq!(
        status_code(Operation::StartPairing, ConnectionStatus::QRCodeGenerated),
        HttpStatusCode::ACCEPTED
    );
    assert_eq!(
        status_code(Operation::StartPairing, ConnectionStatus::SignedIn),
        HttpStatusCode::OK
    );
}

#[test]
fn given_status_operation_cannot_produce_when_mapped_then_500() {
    assert_eq!(
        status_code(Operation::SendMessage, ConnectionStatus::QRCodeGenerated),
        HttpStatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_code(Operation::StartPairing, ConnectionStatus::MessageSent),
        HttpStatusCode::INTERNAL_SERVER_ERROR
    );
}
