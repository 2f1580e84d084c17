//! Key-value slots backing the task collection.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access storage slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("storage slot '{key}' holds invalid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A flat string-keyed store, the moral equivalent of browser local storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read a slot. A slot that was never written reads as `None`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's entire value.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per slot under a data directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a half-written collection behind.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Storage slot not written yet");
                Ok(None)
            }
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { key: key.to_string(), source };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.slot_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value.as_bytes()).map_err(io_err)?;
        fs::rename(&tmp_path, &path).map_err(io_err)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }
}

/// Process-local storage, for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory storage lock poisoned".into()))
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_slot_missing_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.read("nothing").unwrap().is_none());
    }

    #[test]
    fn file_slot_write_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        storage.write("k", "[1]").unwrap();
        storage.write("k", "[1,2]").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("[1,2]"));
        assert!(!storage.slot_path("k").with_extension("json.tmp").exists());
    }

    #[test]
    fn file_slot_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        storage.write("k", "[]").unwrap();
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.read("k").unwrap().is_none());
    }

    #[test]
    fn memory_slots_are_independent() {
        let storage = InMemoryStorage::new();
        storage.write("a", "1").unwrap();
        storage.write("b", "2").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("b").unwrap().as_deref(), Some("2"));
    }
}
