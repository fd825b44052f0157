//! Anchor Store implementations

use super::error::StorageError;
use super::record::{parse_record, render_record};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;

/// Durable per-source anchor storage
///
/// Callers must not run `load`/`store` for the same source concurrently;
/// the scheduler guarantees this by dispatching each source once per cycle.
#[async_trait]
pub trait AnchorStore: Send + Sync {
    /// Last persisted anchor, creating a zero record if none exists
    async fn load(&self, source: &str) -> Result<u64, StorageError>;

    /// Replace the persisted anchor
    async fn store(&self, source: &str, anchor: u64) -> Result<(), StorageError>;
}

/// One `<name>.igu` record per source under a root directory
#[derive(Debug, Clone)]
pub struct FileAnchorStore {
    root: PathBuf,
}

impl FileAnchorStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed
    pub async fn prepare(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Write {
                path: self.root.clone(),
                source,
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record path for a source
    pub fn record_path(&self, source: &str) -> PathBuf {
        self.root.join(format!("{}.igu", source))
    }

    // Write to a sibling temp file, fsync, then rename over the record so a
    // crash leaves either the old or the new value.
    async fn write_atomic(&self, path: &Path, anchor: u64) -> Result<(), StorageError> {
        let temp_path = path.with_extension("igu.tmp");
        let write_err = |source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut temp_file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(write_err)?;
        temp_file
            .write_all(render_record(anchor).as_bytes())
            .await
            .map_err(write_err)?;
        temp_file.sync_all().await.map_err(write_err)?;
        drop(temp_file);

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(write_err)?;

        #[cfg(unix)]
        {
            if let Some(parent) = path.parent() {
                if let Ok(dir) = tokio::fs::File::open(parent).await {
                    let _ = dir.sync_all().await;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AnchorStore for FileAnchorStore {
    async fn load(&self, source: &str) -> Result<u64, StorageError> {
        let path = self.record_path(source);

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_record(&contents)
                .map_err(|reason| StorageError::Corrupt { path, reason }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.write_atomic(&path, 0).await?;
                log::info!("[{}] created anchor record {}", source, path.display());
                Ok(0)
            }
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    async fn store(&self, source: &str, anchor: u64) -> Result<(), StorageError> {
        let path = self.record_path(source);
        self.write_atomic(&path, anchor).await?;
        log::trace!("[{}] anchor stored: {}", source, anchor);
        Ok(())
    }
}

/// Volatile anchor storage, for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryAnchorStore {
    anchors: Mutex<HashMap<String, u64>>,
}

impl MemoryAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value without creating a record
    pub fn get(&self, source: &str) -> Option<u64> {
        self.lock().get(source).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u64>> {
        // A panic while holding the guard cannot leave the map half-updated.
        self.anchors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AnchorStore for MemoryAnchorStore {
    async fn load(&self, source: &str) -> Result<u64, StorageError> {
        Ok(*self.lock().entry(source.to_string()).or_insert(0))
    }

    async fn store(&self, source: &str, anchor: u64) -> Result<(), StorageError> {
        self.lock().insert(source.to_string(), anchor);
        Ok(())
    }
}
