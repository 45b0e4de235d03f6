//! Route handlers and the status to HTTP code table.

use crate::controller::{PairingMode, SessionController};
use crate::status::{ConnectionStatus, StatusReport};

use common::HttpStatusCode;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

pub const MALFORMED_SEND_BODY_MESSAGE: &str =
    "Malformed request body, must contain message and phone_number";

const MALFORMED_QUERY_MESSAGE: &str = "Malformed query, force must be true or false";

/// Controller operation behind a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetStatus,
    SendMessage,
    StartPairing,
}

/// HTTP status for `status` returned by `operation`.
pub fn status_code(operation: Operation, status: ConnectionStatus) -> HttpStatusCode {
    use ConnectionStatus::*;

    match (operation, status) {
        (_, LibraryError) => HttpStatusCode::INTERNAL_SERVER_ERROR,

        (Operation::GetStatus, _) => HttpStatusCode::OK,

        (Operation::SendMessage, MessageSent) => HttpStatusCode::CREATED,
        (Operation::SendMessage, SignedOut) => HttpStatusCode::BAD_REQUEST,
        (Operation::SendMessage, NotConnected) => HttpStatusCode::INTERNAL_SERVER_ERROR,
        (Operation::SendMessage, TargetNotOnNetwork) => HttpStatusCode::CONFLICT,

        (Operation::StartPairing, QRCodeGenerated) => HttpStatusCode::ACCEPTED,
        (Operation::StartPairing, SignedIn) => HttpStatusCode::OK,

        (operation, status) => {
            error!("{operation:?} produced unexpected status {status}");
            HttpStatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: SessionController,
    /// Applied when `/start_connection` has no `force` parameter.
    pub(crate) default_pairing_mode: PairingMode,
}

/// Body of `POST /send_message`. Both fields must be present and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartConnectionQuery {
    force: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_message: &'static str,
}

pub(crate) async fn info(State(state): State<AppState>) -> Response {
    let report = state.controller.check_status().await;
    debug!("GET /info -> {}", report.status);
    respond(Operation::GetStatus, report)
}

pub(crate) async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request))
            if !request.phone_number.trim().is_empty() && !request.message.is_empty() =>
        {
            request
        }
        Ok(_) => return bad_request(MALFORMED_SEND_BODY_MESSAGE),
        Err(rejection) => {
            warn!("Rejected send_message body: {rejection}");
            return bad_request(MALFORMED_SEND_BODY_MESSAGE);
        }
    };

    let report = state
        .controller
        .send_message(request.phone_number, request.message)
        .await;
    info!("POST /send_message -> {}", report.status);
    respond(Operation::SendMessage, report)
}

pub(crate) async fn start_connection(
    State(state): State<AppState>,
    query: Result<Query<StartConnectionQuery>, QueryRejection>,
) -> Response {
    let mode = match query {
        Ok(Query(StartConnectionQuery { force: Some(force) })) => PairingMode::from_force(force),
        Ok(Query(StartConnectionQuery { force: None })) => state.default_pairing_mode,
        Err(rejection) => {
            warn!("Rejected start_connection query: {rejection}");
            return bad_request(MALFORMED_QUERY_MESSAGE);
        }
    };

    let report = state.controller.start_pairing(mode).await;
    info!("POST /start_connection ({mode:?}) -> {}", report.status);
    respond(Operation::StartPairing, report)
}

fn respond(operation: Operation, report: StatusReport) -> Response {
    let code = status_code(operation, report.status);
    (to_axum(code), Json(report)).into_response()
}

fn bad_request(error_message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error_message })).into_response()
}

fn to_axum(code: HttpStatusCode) -> StatusCode {
    StatusCode::from_u16(code.0).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
