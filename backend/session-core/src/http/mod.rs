//! HTTP/JSON adapter over the [`SessionController`](crate::controller::SessionController).
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /info` | `check_status` |
//! | `POST /send_message` | `send_message` |
//! | `POST /start_connection[?force=bool]` | `start_pairing` |
//!
//! The adapter only translates: request decoding, the status to HTTP code
//! table in [`status_code`], and JSON encoding of the
//! [`StatusReport`](crate::status::StatusReport). Every decision lives in
//! the controller.

mod handle;
mod routes;
mod server;

pub use handle::HttpServerHandle;
pub use routes::{MALFORMED_SEND_BODY_MESSAGE, Operation, SendMessageRequest, status_code};
pub use server::{build_router, start_http_server};
