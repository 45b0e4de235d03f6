//! Collaborators of the session controller.
//!
//! The messaging protocol (wire format, encryption, multi-device sync) lives
//! outside this crate. The controller only sees it through three seams:
//!
//! - [`SessionStore`]: durable paired-device credentials
//! - [`ClientConnector`]: builds a protocol client for one device slot
//! - [`ProtocolClient`]: one connection to the messaging network
//!
//! Two implementations ship with the crate: [`FileSessionStore`] persists
//! devices to a JSON file, and the [`loopback`] backend is an offline client
//! used for local development and adapter tests.

pub mod file_store;
pub mod loopback;

pub use file_store::FileSessionStore;
pub use loopback::{LoopbackConnector, LoopbackNetwork};

use crate::error::BackendError;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// One stored identity slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Local slot id, stable for the lifetime of the record.
    pub slot: Uuid,
    /// Account id assigned by the network once pairing completed.
    #[serde(default)]
    pub linked_id: Option<String>,
}

impl DeviceRecord {
    /// A fresh, unlinked slot.
    pub fn unlinked() -> Self {
        Self {
            slot: Uuid::new_v4(),
            linked_id: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.linked_id.is_some()
    }
}

/// A resolved account on the network that can receive messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// The phone number as queried.
    pub query: String,
    /// Network-side address of the account.
    pub address: String,
}

/// Events emitted while a new device is being linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    /// A QR payload to present to the user.
    Code(String),
    /// The current code expired without being scanned.
    Timeout,
    /// The remote side scanned a code and the device is linked.
    Success { linked_id: String },
    /// The network refused to continue pairing.
    Error(String),
}

/// Durable store of paired-device credentials.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Every stored device.
    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, BackendError>;

    /// Removes one device. Deleting an unknown slot is not an error.
    async fn delete_device(&self, device: &DeviceRecord) -> Result<(), BackendError>;

    /// Inserts or replaces the device with the same slot.
    async fn save_device(&self, device: &DeviceRecord) -> Result<(), BackendError>;

    /// The first stored device, or a fresh unsaved slot when the store is empty.
    async fn first_device(&self) -> Result<DeviceRecord, BackendError>;

    /// Flushes and releases the store. Later calls fail with `StoreClosed`.
    async fn close(&self) -> Result<(), BackendError>;
}

/// A connection to the messaging network for one device slot.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Linked account id of the device this client runs as, `None` before pairing.
    fn linked_id(&self) -> Result<Option<String>, BackendError>;

    /// Opens the pairing event stream. Must be called before `connect`.
    async fn pairing_events(&self) -> Result<mpsc::Receiver<PairingEvent>, BackendError>;

    async fn connect(&self) -> Result<(), BackendError>;

    async fn disconnect(&self);

    /// Accounts registered for `phone_number`; empty when it is not on the network.
    async fn lookup_recipients(&self, phone_number: &str) -> Result<Vec<Recipient>, BackendError>;

    async fn send_text(&self, recipient: &Recipient, text: &str) -> Result<(), BackendError>;
}

/// Builds protocol clients. The connector decides which network they talk to.
pub trait ClientConnector: Send + Sync {
    fn new_client(&self, device: DeviceRecord) -> Arc<dyn ProtocolClient>;
}
