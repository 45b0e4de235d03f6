//! Shared building blocks for the WhatsApp bridge.
//!
//! ## Architecture
//!
//! - **common** (this crate): error locations and HTTP status helpers
//! - **session-core**: session controller, collaborators and the HTTP adapter
//! - **bridge**: the binary wiring config, logging and shutdown together

pub mod error;
pub mod http_status;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
