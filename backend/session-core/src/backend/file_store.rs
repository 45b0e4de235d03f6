//! JSON file backed [`SessionStore`].
//!
//! All devices live in one file. Every mutation rewrites the whole file via a
//! temp file + rename so a crash never leaves a half-written store behind.

use super::{DeviceRecord, SessionStore};
use crate::error::BackendError;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "default_format_version")]
    version: u32,
    #[serde(default)]
    devices: Vec<DeviceRecord>,
}

fn default_format_version() -> u32 {
    STORE_FORMAT_VERSION
}

struct StoreState {
    devices: Vec<DeviceRecord>,
    closed: bool,
}

pub struct FileSessionStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl FileSessionStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store; it is only created on first write.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Store`] if the file exists but cannot be read or
    /// parsed, or if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let devices = if fs::try_exists(&path).await? {
            let contents = fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&contents)?;

            if file.version != STORE_FORMAT_VERSION {
                return Err(BackendError::store(format!(
                    "Unsupported store format version {} in {}",
                    file.version,
                    path.display()
                )));
            }

            info!(
                "Session store opened at {} ({} device(s))",
                path.display(),
                file.devices.len()
            );
            file.devices
        } else {
            info!("Session store not found at {}, starting empty", path.display());
            Vec::new()
        };

        Ok(Self {
            path,
            state: Mutex::new(StoreState {
                devices,
                closed: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, devices: &[DeviceRecord]) -> Result<(), BackendError> {
        let file = StoreFile {
            version: STORE_FORMAT_VERSION,
            devices: devices.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("Session store written ({} device(s))", devices.len());
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, BackendError> {
        let state = self.state.lock().await;
        if state.closed {
            return Err(BackendError::store_closed());
        }
        Ok(state.devices.clone())
    }

    async fn delete_device(&self, device: &DeviceRecord) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(BackendError::store_closed());
        }

        if !state.devices.iter().any(|d| d.slot == device.slot) {
            debug!("Device {} not in store, nothing to delete", device.slot);
            return Ok(());
        }

        let mut devices = state.devices.clone();
        devices.retain(|d| d.slot != device.slot);

        // Memory follows disk: only a successful write is applied.
        self.persist(&devices).await?;
        state.devices = devices;
        info!("Deleted device {} from session store", device.slot);
        Ok(())
    }

    async fn save_device(&self, device: &DeviceRecord) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(BackendError::store_closed());
        }

        let mut devices = state.devices.clone();
        match devices.iter_mut().find(|d| d.slot == device.slot) {
            Some(existing) => *existing = device.clone(),
            None => devices.push(device.clone()),
        }

        self.persist(&devices).await?;
        state.devices = devices;
        info!("Saved device {} to session store", device.slot);
        Ok(())
    }

    async fn first_device(&self) -> Result<DeviceRecord, BackendError> {
        let state = self.state.lock().await;
        if state.closed {
            return Err(BackendError::store_closed());
        }

        Ok(state
            .devices
            .first()
            .cloned()
            .unwrap_or_else(DeviceRecord::unlinked))
    }

    async fn close(&self) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if state.closed {
            warn!("Session store already closed");
            return Ok(());
        }

        if !state.devices.is_empty() || fs::try_exists(&self.path).await? {
            self.persist(&state.devices).await?;
        }

        state.closed = true;
        info!("Session store closed at {}", self.path.display());
        Ok(())
    }
}
