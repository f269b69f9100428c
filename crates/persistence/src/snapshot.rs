//! Named JSON snapshots
//!
//! A snapshot is a whole JSON document addressed by a short name
//! (`variants`, `stats`). Reads return `None` when the snapshot does not
//! exist yet and `PersistenceError::Corrupt` when it cannot be parsed, so
//! callers can fall back to an empty state. Writes replace the document as
//! a whole.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

/// Snapshot persistence provider
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read a snapshot; `Ok(None)` when it has never been written
    async fn read_snapshot(&self, name: &str) -> Result<Option<Value>, PersistenceError>;

    /// Replace a snapshot
    async fn write_snapshot(&self, name: &str, value: &Value) -> Result<(), PersistenceError>;

    /// Backend name for logs and readiness
    fn backend(&self) -> &'static str;
}

/// File-backed store: one `<name>.json` per snapshot under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing a snapshot
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    fn check_name(name: &str) -> Result<(), PersistenceError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(PersistenceError::InvalidName(name.to_string()))
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn read_snapshot(&self, name: &str) -> Result<Option<Value>, PersistenceError> {
        Self::check_name(name)?;
        let path = self.path_for(name);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(snapshot = name, path = %path.display(), "Snapshot not found");
                return Ok(None);
            }
            Err(e) => return Err(PersistenceError::io(name, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PersistenceError::Corrupt {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    async fn write_snapshot(&self, name: &str, value: &Value) -> Result<(), PersistenceError> {
        Self::check_name(name)?;
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| PersistenceError::io(name, e))?;

        let bytes = serde_json::to_vec_pretty(value)?;
        let path = self.path_for(name);
        let tmp = self.data_dir.join(format!(".{}.json.tmp", name));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| PersistenceError::io(name, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PersistenceError::io(name, e))?;

        tracing::trace!(snapshot = name, bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "json_file"
    }
}

/// In-memory store for tests and ephemeral deployments
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshots: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot
    pub fn with_snapshot(self, name: impl Into<String>, value: Value) -> Self {
        self.snapshots.write().insert(name.into(), value);
        self
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn read_snapshot(&self, name: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.snapshots.read().get(name).cloned())
    }

    async fn write_snapshot(&self, name: &str, value: &Value) -> Result<(), PersistenceError> {
        self.snapshots.write().insert(name.to_string(), value.clone());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }
}
