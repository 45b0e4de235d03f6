//! Offline stand-in for the messaging network.
//!
//! [`LoopbackNetwork`] knows a fixed set of registered phone numbers and
//! records every message sent to them instead of delivering it. Pairing
//! hands out a generated QR payload and, when a scan delay is configured,
//! links the device after that delay as if a phone had scanned the code.
//!
//! Used by the bridge binary when no real protocol library is wired in, and
//! by the adapter tests.

use super::{ClientConnector, DeviceRecord, PairingEvent, ProtocolClient, Recipient, SessionStore};
use crate::error::BackendError;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

const PAIRING_CHANNEL_CAPACITY: usize = 8;
const LOOPBACK_ADDRESS_SUFFIX: &str = "@s.loopback.net";

/// A message accepted by the loopback network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub address: String,
    pub text: String,
}

/// Shared state of the simulated network.
pub struct LoopbackNetwork {
    store: Arc<dyn SessionStore>,
    registered: RwLock<HashSet<String>>,
    sent: Mutex<Vec<SentMessage>>,
    scan_delay: Option<Duration>,
}

impl LoopbackNetwork {
    pub fn new(
        store: Arc<dyn SessionStore>,
        registered_numbers: impl IntoIterator<Item = String>,
        scan_delay: Option<Duration>,
    ) -> Self {
        let registered = registered_numbers
            .into_iter()
            .map(|number| normalize_number(&number))
            .filter(|number| !number.is_empty())
            .collect();

        Self {
            store,
            registered: RwLock::new(registered),
            sent: Mutex::new(Vec::new()),
            scan_delay,
        }
    }

    pub async fn register(&self, phone_number: &str) {
        self.registered
            .write()
            .await
            .insert(normalize_number(phone_number));
    }

    /// Everything sent so far, oldest first.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

/// Builds [`LoopbackClient`]s bound to one [`LoopbackNetwork`].
#[derive(Clone)]
pub struct LoopbackConnector {
    network: Arc<LoopbackNetwork>,
}

impl LoopbackConnector {
    pub fn new(network: Arc<LoopbackNetwork>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &Arc<LoopbackNetwork> {
        &self.network
    }
}

impl ClientConnector for LoopbackConnector {
    fn new_client(&self, device: DeviceRecord) -> Arc<dyn ProtocolClient> {
        Arc::new(LoopbackClient {
            inner: Arc::new(ClientInner {
                device: StdMutex::new(device),
                connected: AtomicBool::new(false),
                network: Arc::clone(&self.network),
            }),
            pairing_tx: Mutex::new(None),
            pairing_task: Mutex::new(None),
        })
    }
}

struct ClientInner {
    device: StdMutex<DeviceRecord>,
    connected: AtomicBool,
    network: Arc<LoopbackNetwork>,
}

impl ClientInner {
    fn device(&self) -> Result<DeviceRecord, BackendError> {
        self.device
            .lock()
            .map(|device| device.clone())
            .map_err(|e| BackendError::store(format!("Device state poisoned: {e}")))
    }

    fn link(&self, linked_id: &str) -> Result<(), BackendError> {
        let mut device = self
            .device
            .lock()
            .map_err(|e| BackendError::store(format!("Device state poisoned: {e}")))?;
        device.linked_id = Some(linked_id.to_string());
        Ok(())
    }

    fn require_connected(&self) -> Result<(), BackendError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::not_connected("loopback client is not connected"))
        }
    }
}

pub struct LoopbackClient {
    inner: Arc<ClientInner>,
    pairing_tx: Mutex<Option<mpsc::Sender<PairingEvent>>>,
    pairing_task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl ProtocolClient for LoopbackClient {
    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    fn linked_id(&self) -> Result<Option<String>, BackendError> {
        Ok(self.inner.device()?.linked_id)
    }

    async fn pairing_events(&self) -> Result<mpsc::Receiver<PairingEvent>, BackendError> {
        if self.inner.device()?.is_linked() {
            return Err(BackendError::rejected(
                "pairing stream requested for an already linked device",
            ));
        }
        if self.is_connected() {
            return Err(BackendError::rejected(
                "pairing stream must be opened before connecting",
            ));
        }

        let (tx, rx) = mpsc::channel(PAIRING_CHANNEL_CAPACITY);
        *self.pairing_tx.lock().await = Some(tx);
        Ok(rx)
    }

    async fn connect(&self) -> Result<(), BackendError> {
        if self.inner.connected.swap(true, Ordering::SeqCst) {
            debug!("Loopback client already connected");
            return Ok(());
        }

        let device = self.inner.device()?;
        info!("Loopback client connected (slot {})", device.slot);

        if let Some(tx) = self.pairing_tx.lock().await.take() {
            let inner = Arc::clone(&self.inner);
            let task = tokio::spawn(run_pairing(inner, tx));
            *self.pairing_task.lock().await = Some(task);
        }

        Ok(())
    }

    async fn disconnect(&self) {
        if let Some(task) = self.pairing_task.lock().await.take() {
            task.abort();
        }
        self.pairing_tx.lock().await.take();

        if self.inner.connected.swap(false, Ordering::SeqCst) {
            info!("Loopback client disconnected");
        }
    }

    async fn lookup_recipients(&self, phone_number: &str) -> Result<Vec<Recipient>, BackendError> {
        self.inner.require_connected()?;

        let normalized = normalize_number(phone_number);
        let registered = self.inner.network.registered.read().await;

        if normalized.is_empty() || !registered.contains(&normalized) {
            debug!("Loopback lookup: {phone_number} is not registered");
            return Ok(Vec::new());
        }

        Ok(vec![Recipient {
            query: phone_number.to_string(),
            address: format!("{normalized}{LOOPBACK_ADDRESS_SUFFIX}"),
        }])
    }

    async fn send_text(&self, recipient: &Recipient, text: &str) -> Result<(), BackendError> {
        self.inner.require_connected()?;

        self.inner.network.sent.lock().await.push(SentMessage {
            address: recipient.address.clone(),
            text: text.to_string(),
        });
        debug!("Loopback message accepted for {}", recipient.address);
        Ok(())
    }
}

/// Emits one QR code, then links the device once the simulated scan happens.
async fn run_pairing(inner: Arc<ClientInner>, tx: mpsc::Sender<PairingEvent>) {
    let code = format!("2@{}", Uuid::new_v4().simple());
    if tx.send(PairingEvent::Code(code)).await.is_err() {
        debug!("Pairing stream dropped before the code was delivered");
    }

    let Some(delay) = inner.network.scan_delay else {
        return;
    };
    tokio::time::sleep(delay).await;

    let linked_id = format!("{}{LOOPBACK_ADDRESS_SUFFIX}", Uuid::new_v4().simple());
    let device = match inner.device() {
        Ok(device) => DeviceRecord {
            linked_id: Some(linked_id.clone()),
            ..device
        },
        Err(e) => {
            warn!("Loopback pairing could not read device: {e}");
            let _ = tx.send(PairingEvent::Error(e.message())).await;
            return;
        }
    };

    // Persisted before the link becomes visible to status probes.
    if let Err(e) = inner.network.store.save_device(&device).await {
        warn!("Loopback pairing could not persist device: {e}");
        let _ = tx.send(PairingEvent::Error(e.message())).await;
        return;
    }

    if let Err(e) = inner.link(&linked_id) {
        warn!("Loopback pairing could not link device: {e}");
        let _ = tx.send(PairingEvent::Error(e.message())).await;
        return;
    }

    info!("Loopback device {} linked as {linked_id}", device.slot);
    let _ = tx.send(PairingEvent::Success { linked_id }).await;
}

/// Digits only, so `+1 (555) 123-4567` and `15551234567` are the same number.
fn normalize_number(phone_number: &str) -> String {
    phone_number.chars().filter(char::is_ascii_digit).collect()
}
