//! Append-only per-check probe logs with gzip archival.
//!
//! Live logs are `{logs_dir}/{id}.log`, one JSON line per probe attempt.
//! Rotation compresses a live log's content into a write-once
//! `{archive_id}.gz` and truncates the live file; archives are never
//! re-opened by the service.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

use super::map_missing;

/// Append-only text log storage plus archival of live logs.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one line to a log, creating the log on first append.
    async fn append(&self, id: &str, line: &str) -> Result<(), StoreError>;

    /// List log ids: live logs, plus archives when `include_archived`.
    async fn list(&self, include_archived: bool) -> Result<Vec<String>, StoreError>;

    /// Read the full current content of a live log.
    async fn read(&self, id: &str) -> Result<String, StoreError>;

    /// Compress a live log's content into a new archive named `archive_id`.
    async fn compress(&self, id: &str, archive_id: &str) -> Result<(), StoreError>;

    /// Truncate a live log to empty.
    async fn truncate(&self, id: &str) -> Result<(), StoreError>;
}

/// File-backed log store under a single logs directory.
pub struct FileLogStore {
    base_dir: PathBuf,
}

impl FileLogStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn live_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{id}.log"))
    }

    fn archive_path(&self, archive_id: &str) -> PathBuf {
        self.base_dir.join(format!("{archive_id}.gz"))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn append(&self, id: &str, line: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir).await?;

        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.live_path(id))
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        Ok(())
    }

    async fn list(&self, include_archived: bool) -> Result<Vec<String>, StoreError> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("log") => ids.push(stem.to_string()),
                Some("gz") if include_archived => ids.push(stem.to_string()),
                _ => {}
            }
        }
        Ok(ids)
    }

    async fn read(&self, id: &str) -> Result<String, StoreError> {
        fs::read_to_string(self.live_path(id)).await.map_err(map_missing)
    }

    async fn compress(&self, id: &str, archive_id: &str) -> Result<(), StoreError> {
        let content = fs::read(self.live_path(id)).await.map_err(map_missing)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&content)?;
        let compressed = encoder.finish()?;

        fs::write(self.archive_path(archive_id), compressed).await?;
        Ok(())
    }

    async fn truncate(&self, id: &str) -> Result<(), StoreError> {
        let path = self.live_path(id);
        fs::metadata(&path).await.map_err(map_missing)?;
        fs::write(path, b"").await?;
        Ok(())
    }
}
