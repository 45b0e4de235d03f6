// Unit tests for FileSessionStore.
// Restart persistence through the full controller is in integration_tests/store.rs

use crate::backend::{DeviceRecord, FileSessionStore, SessionStore};
use crate::error::BackendError;

use tempfile::TempDir;

fn linked(id: &str) -> DeviceRecord {
    DeviceRecord {
        slot: uuid::Uuid::new_v4(),
        linked_id: Some(id.to_string()),
    }
}

#[tokio::test]
async fn given_missing_file_when_open_then_empty_store_and_no_file_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let store = FileSessionStore::open(&path).await.unwrap();

    assert!(store.list_devices().await.unwrap().is_empty());
    assert!(!path.exists());
    assert!(path.parent().unwrap().exists());
}

/// **VALUE**: An empty store still hands out a usable slot.
///
/// **WHY THIS MATTERS**: Pairing asks for the first device right after wiping
/// the store. It must get a fresh unlinked slot rather than an error.
#[tokio::test]
async fn given_empty_store_when_first_device_then_fresh_unlinked_slot() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path().join("s.json")).await.unwrap();

    let device = store.first_device().await.unwrap();

    assert!(!device.is_linked());
    assert!(
        store.list_devices().await.unwrap().is_empty(),
        "fresh slot is not saved until linked"
    );
}

#[tokio::test]
async fn given_saved_devices_when_reopened_then_persisted_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("s.json");
    let first = linked("a@s.test");
    let second = linked("b@s.test");

    {
        let store = FileSessionStore::open(&path).await.unwrap();
        store.save_device(&first).await.unwrap();
        store.save_device(&second).await.unwrap();
        store.close().await.unwrap();
    }

    let reopened = FileSessionStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_devices().await.unwrap(), vec![first.clone(), second]);
    assert_eq!(reopened.first_device().await.unwrap(), first);
    assert!(!dir.path().join("s.json.tmp").exists());
}

#[tokio::test]
async fn given_same_slot_when_saved_twice_then_replaced_not_duplicated() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path().join("s.json")).await.unwrap();
    let mut device = DeviceRecord::unlinked();
    store.save_device(&device).await.unwrap();

    device.linked_id = Some("a@s.test".to_string());
    store.save_device(&device).await.unwrap();

    assert_eq!(store.list_devices().await.unwrap(), vec![device]);
}

#[tokio::test]
async fn given_devices_when_deleted_then_removed_and_unknown_slot_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("s.json");
    let store = FileSessionStore::open(&path).await.unwrap();
    let keep = linked("keep@s.test");
    let gone = linked("gone@s.test");
    store.save_device(&keep).await.unwrap();
    store.save_device(&gone).await.unwrap();

    store.delete_device(&gone).await.unwrap();
    store.delete_device(&linked("never@s.test")).await.unwrap();

    assert_eq!(store.list_devices().await.unwrap(), vec![keep.clone()]);
    let reopened = FileSessionStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_devices().await.unwrap(), vec![keep]);
}

/// **VALUE**: A closed store refuses further use.
///
/// **BUG THIS CATCHES**: Writes after shutdown could race with a second process
/// that already opened the same file.
#[tokio::test]
async fn given_closed_store_when_used_then_store_closed_error() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path().join("s.json")).await.unwrap();
    store.close().await.unwrap();

    let listed = store.list_devices().await;
    let saved = store.save_device(&linked("a@s.test")).await;
    let first = store.first_device().await;

    assert!(matches!(listed, Err(BackendError::StoreClosed { .. })));
    assert!(matches!(saved, Err(BackendError::StoreClosed { .. })));
    assert!(matches!(first, Err(BackendError::StoreClosed { .. })));
    assert!(store.close().await.is_ok(), "second close is a no-op");
}

#[tokio::test]
async fn given_corrupt_file_when_open_then_store_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "][").unwrap();

    let result = FileSessionStore::open(&path).await;

    match result {
        Err(e @ BackendError::Store { .. }) => {
            assert!(e.message().starts_with("Corrupt store file:"))
        }
        Err(other) => panic!("Expected Store error, got {other:?}"),
        Ok(_) => panic!("Expected Store error, got Ok"),
    }
}

#[tokio::test]
async fn given_unknown_format_version_when_open_then_store_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, r#"{ "version": 9, "devices": [] }"#).unwrap();

    let result = FileSessionStore::open(&path).await;

    assert!(matches!(result, Err(BackendError::Store { .. })));
}

/// Blocks the temp file the store writes through, so the next persist fails.
fn block_temp_write(dir: &TempDir) -> std::path::PathBuf {
    let blocker = dir.path().join("s.json.tmp");
    std::fs::create_dir(&blocker).unwrap();
    blocker
}

/// **VALUE**: A delete that fails to reach disk leaves the store unchanged.
///
/// **WHY THIS MATTERS**: The caller is told the delete failed. If memory kept
/// the removal anyway, the next successful write or `close` would apply it
/// silently.
///
/// **BUG THIS CATCHES**: Mutating the in-memory list before the write succeeds.
#[tokio::test]
async fn given_write_fails_when_delete_device_then_device_kept_in_memory_and_on_disk() {
    // GIVEN: A store holding one device whose next write will fail
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("s.json");
    let device = linked("a@s.test");
    let store = FileSessionStore::open(&path).await.unwrap();
    store.save_device(&device).await.unwrap();
    let blocker = block_temp_write(&dir);

    // WHEN: Deleting the device
    let result = store.delete_device(&device).await;

    // THEN: The error is reported and the device is still listed
    assert!(matches!(result, Err(BackendError::Store { .. })));
    assert_eq!(store.list_devices().await.unwrap(), vec![device.clone()]);

    // AND: A later flush does not apply the failed delete
    std::fs::remove_dir(&blocker).unwrap();
    store.close().await.unwrap();
    let reopened = FileSessionStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_devices().await.unwrap(), vec![device]);
}

#[tokio::test]
async fn given_write_fails_when_save_device_then_device_not_listed() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path().join("s.json")).await.unwrap();
    block_temp_write(&dir);

    let result = store.save_device(&linked("a@s.test")).await;

    assert!(matches!(result, Err(BackendError::Store { .. })));
    assert!(store.list_devices().await.unwrap().is_empty());
}
