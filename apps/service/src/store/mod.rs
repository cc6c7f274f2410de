//! Durable keyed storage of JSON records, grouped by collection.
//!
//! The monitoring pipeline only needs the narrow contract below; it never
//! cares how records are laid out. The production implementation keeps one
//! JSON file per record under `{base_dir}/{collection}/{key}.json`.

pub mod logs;

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// Keyed JSON record storage. Per-key operations are atomic; no cross-key
/// transactions are offered or assumed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new record. Fails with `AlreadyExists` if the key is taken.
    async fn create(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError>;

    /// Read a record by key.
    async fn read(&self, collection: &str, key: &str) -> Result<Value, StoreError>;

    /// Replace an existing record. Fails with `NotFound` if the key is absent.
    async fn update(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError>;

    /// Delete a record by key.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// List all keys in a collection. An unknown collection lists empty.
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError>;
}

/// File-backed record store: one `{key}.json` file per record.
pub struct FileRecordStore {
    base_dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{key}.json"))
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn create(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError> {
        fs::create_dir_all(self.base_dir.join(collection)).await?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.record_path(collection, key))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists,
                _ => StoreError::Io(e),
            })?;

        file.write_all(&serde_json::to_vec(record)?).await?;
        Ok(())
    }

    async fn read(&self, collection: &str, key: &str) -> Result<Value, StoreError> {
        let bytes = fs::read(self.record_path(collection, key)).await.map_err(map_missing)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update(&self, collection: &str, key: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, key);
        fs::metadata(&path).await.map_err(map_missing)?;
        fs::write(path, serde_json::to_vec(record)?).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        fs::remove_file(self.record_path(collection, key)).await.map_err(map_missing)
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

fn map_missing(e: std::io::Error) -> StoreError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound,
        _ => StoreError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_read_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        let record = json!({"id": "abc", "state": "down"});
        store.create("checks", "abc", &record).await.unwrap();

        assert_eq!(store.read("checks", "abc").await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_create_fails_when_key_taken() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        store.create("checks", "abc", &json!({})).await.unwrap();
        let err = store.create("checks", "abc", &json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_update_replaces_existing_record() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        store.create("checks", "abc", &json!({"state": "down"})).await.unwrap();
        store.update("checks", "abc", &json!({"state": "up"})).await.unwrap();

        assert_eq!(store.read("checks", "abc").await.unwrap()["state"], "up");
    }

    #[tokio::test]
    async fn test_update_and_read_fail_on_missing_key() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        assert!(matches!(
            store.update("checks", "nope", &json!({})).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(store.read("checks", "nope").await.unwrap_err(), StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        store.create("checks", "abc", &json!({})).await.unwrap();
        store.delete("checks", "abc").await.unwrap();

        assert!(matches!(store.read("checks", "abc").await.unwrap_err(), StoreError::NotFound));
        assert!(matches!(store.delete("checks", "abc").await.unwrap_err(), StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_list_strips_extension_and_handles_unknown_collection() {
        let dir = tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        assert!(store.list("checks").await.unwrap().is_empty());

        store.create("checks", "one", &json!({})).await.unwrap();
        store.create("checks", "two", &json!({})).await.unwrap();

        let mut keys = store.list("checks").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["one", "two"]);
    }
}
