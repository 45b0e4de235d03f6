pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod status;

#[cfg(test)]
mod tests;

pub use controller::{ControllerSettings, PairingMode, SessionController};
pub use status::{ConnectionStatus, StatusReport};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5003;
