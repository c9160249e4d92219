//! Key-value persistence slots for the serialized cart.
//!
//! A [`PersistenceSlot`] is the local-storage equivalent the store mirrors
//! every committed cart into. Two backends are provided:
//!
//! - [`MemorySlot`] - process-local map, lost on exit
//! - [`FileSlot`] - JSON object on disk, survives across runs
//!
//! Both are synchronous: a write either lands before the store publishes the
//! new cart or the commit is abandoned.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

/// Errors that can occur when reading or writing a slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored value could not be encoded or decoded.
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable string storage addressed by key.
pub trait PersistenceSlot: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: PersistenceSlot + ?Sized> PersistenceSlot for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// MemorySlot
// =============================================================================

/// In-memory slot.
///
/// Cheaply cloneable; clones share the same map, so a test can keep a handle
/// and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-populated with `key = value`.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        slot
    }
}

impl PersistenceSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// FileSlot
// =============================================================================

/// Slot backed by a JSON object file mapping keys to string values.
///
/// A missing file reads as an empty map. Writes rewrite the whole file via a
/// temporary sibling and a rename, so a crash mid-write leaves the previous
/// contents intact. A file that is not a JSON object fails reads but is
/// replaced by the next write, the way browser storage overwrites a bad value.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSlot {
    /// Create a slot stored at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistenceSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Json(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Storage file is corrupt, overwriting"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_slot_get_missing() {
        let slot = MemorySlot::new();
        assert_eq!(slot.get("@RocketShoes:cart").unwrap(), None);
    }

    #[test]
    fn test_memory_slot_clones_share_entries() {
        let slot = MemorySlot::new();
        let handle = slot.clone();
        slot.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_slot_with_entry() {
        let slot = MemorySlot::with_entry("k", "[]");
        assert_eq!(slot.get("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_slot_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("storage.json"));
        assert_eq!(slot.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_slot_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileSlot::new(&path).set("@RocketShoes:cart", "[]").unwrap();
        FileSlot::new(&path).set("other", "x").unwrap();

        let slot = FileSlot::new(&path);
        assert_eq!(slot.get("@RocketShoes:cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(slot.get("other").unwrap().as_deref(), Some("x"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_slot_overwrites_value() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("storage.json"));
        slot.set("k", "1").unwrap();
        slot.set("k", "2").unwrap();
        assert_eq!(slot.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_slot_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let slot = FileSlot::new(&path);
        assert!(matches!(slot.get("k"), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_file_slot_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let slot = FileSlot::new(&path);

        slot.set("@RocketShoes:cart", "[]").unwrap();

        assert_eq!(slot.get("@RocketShoes:cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_slot_write_replaces_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let slot = FileSlot::new(&path);

        slot.set("k", "v").unwrap();

        assert_eq!(slot.get("k").unwrap().as_deref(), Some("v"));
    }
}
