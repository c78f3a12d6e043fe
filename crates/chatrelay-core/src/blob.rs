//! Key → opaque string storage for persisted state.
//!
//! Two fixed keys are used: [`CHAT_HISTORY_KEY`] for the conversation and
//! [`API_CONFIG_KEY`] for the saved `{credential, endpointUrl}` settings.
//!
//! File format: one file per key, `<store_dir>/<safe_key>.json`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::utils;

/// Key under which the conversation log is persisted.
pub const CHAT_HISTORY_KEY: &str = "chat_history";

/// Key under which the saved API settings are persisted.
pub const API_CONFIG_KEY: &str = "api_config";

/// Errors from reading or writing persisted blobs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque blob storage, the local-storage analogue.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the blob under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ─────────────────────────────────────────────
// File-backed store
// ─────────────────────────────────────────────

/// Stores each blob as a file inside a directory.
#[derive(Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// `dir` defaults to `~/.chatrelay/store/` if `None`.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.unwrap_or_else(utils::get_store_path);
        std::fs::create_dir_all(&dir)?;
        Ok(FileBlobStore { dir })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", utils::safe_filename(key)))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.blob_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.blob_path(key);
        std::fs::write(&path, value)?;
        debug!("Wrote blob '{}' ({} bytes) to {}", key, value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.blob_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed blob file: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ─────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────

/// Volatile store, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
