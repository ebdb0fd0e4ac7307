//! Persisted blob stores.
//!
//! Both the result cache and the history log serialize their whole state into
//! one blob under a fixed key. The stores here only move bytes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::error_handling::LookupError;

/// Minimal get/set byte store supplied by the host environment.
pub trait BlobStore: Send + Sync {
    /// Returns the blob stored under `key`, or `None` if there is none.
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, LookupError>;

    /// Replaces the blob stored under `key`.
    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), LookupError>;
}

/// Stores each blob as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file first and are renamed into place, so
/// a crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBlobStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn write_atomically(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create data directory {}", self.dir.display())
        })?;
        let target = self.blob_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, bytes)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
        Ok(())
    }
}

impl BlobStore for FileBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, LookupError> {
        let path = self.blob_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LookupError::Store(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), LookupError> {
        self.write_atomically(key, bytes)
            .map_err(|e| LookupError::Store(format!("{e:#}")))
    }
}

/// In-process blob store, for tests and for runs that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, LookupError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| LookupError::Store("memory store lock poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), LookupError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| LookupError::Store("memory store lock poisoned".to_string()))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Decodes a JSON blob, treating a missing, unreadable or corrupt blob as `None`.
///
/// Failures are logged and never propagated: an unusable store degrades to
/// an empty one.
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Option<T> {
    let bytes = match store.load_blob(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Blob '{}' unavailable, starting empty: {}", key, e);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Blob '{}' is corrupt, starting empty: {}", key, e);
            None
        }
    }
}

/// Encodes `value` as JSON and saves it, logging (not propagating) failures.
pub(crate) fn save_json<T: serde::Serialize + ?Sized>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
) -> bool {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to serialize blob '{}': {}", key, e);
            return false;
        }
    };
    match store.save_blob(key, &bytes) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to persist blob '{}': {}", key, e);
            false
        }
    }
}
