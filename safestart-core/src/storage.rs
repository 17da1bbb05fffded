//! Key-value persistence port, bundled adapters, and the typed slice layer.
//!
//! Trackers never talk to a backend directly: they go through [`ProgressStore`],
//! which turns every backend failure or corrupted payload into "absent" so the
//! caller falls back to its default slice.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::constants::{
    KEY_CHECKLIST, KEY_EXPLORE, KEY_HAZARD, KEY_LAST_VISIT, KEY_MUTE, KEY_QUIZ, KEY_SEASON,
};

/// Durable string key-value storage.
/// Platform-specific implementations should provide this.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// The fixed set of slices persisted by the microsite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Mute,
    Checklist,
    Quiz,
    Hazard,
    Explore,
    Season,
    LastVisit,
}

impl StorageKey {
    /// Every key cleared by a global reset.
    pub const ALL: [Self; 7] = [
        Self::Mute,
        Self::Checklist,
        Self::Quiz,
        Self::Hazard,
        Self::Explore,
        Self::Season,
        Self::LastVisit,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mute => KEY_MUTE,
            Self::Checklist => KEY_CHECKLIST,
            Self::Quiz => KEY_QUIZ,
            Self::Hazard => KEY_HAZARD,
            Self::Explore => KEY_EXPLORE,
            Self::Season => KEY_SEASON,
            Self::LastVisit => KEY_LAST_VISIT,
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-process store shared between clones; used by tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is not a JSON string map: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Store backed by a single JSON object file mapping keys to string values.
///
/// Every operation reads the file, so several handles on one path stay coherent.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| FileStoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        let io_err = |source| FileStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(map).map_err(|source| FileStoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    type Error = FileStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        // A corrupted file is replaced rather than blocking every later write.
        let mut map = self.read_map().unwrap_or_else(|err| {
            log::warn!("discarding unreadable store file: {err}");
            BTreeMap::new()
        });
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(err) => {
                log::warn!("discarding unreadable store file: {err}");
                BTreeMap::new()
            }
        };
        if map.remove(key).is_some() {
            return self.write_map(&map);
        }
        Ok(())
    }
}

/// Typed access to the persisted slices with graceful degradation.
///
/// Reads return `None` for missing, unreadable, or malformed slices; writes
/// that fail are logged and dropped.
#[derive(Debug, Clone)]
pub struct ProgressStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Raw string stored under `key`, if readable.
    #[must_use]
    pub fn read_raw(&self, key: StorageKey) -> Option<String> {
        match self.backend.get(key.as_str()) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("storage read failed for {key}: {err}");
                None
            }
        }
    }

    pub fn write_raw(&self, key: StorageKey, value: &str) {
        match self.backend.set(key.as_str(), value) {
            Ok(()) => log::debug!("persisted {key}"),
            Err(err) => log::warn!("storage write failed for {key}: {err}"),
        }
    }

    /// Deserialize the slice stored under `key`; malformed data reads as absent.
    #[must_use]
    pub fn read_slice<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("ignoring corrupted slice {key}: {err}");
                None
            }
        }
    }

    /// Serialize and store a full slice.
    pub fn write_slice<T: Serialize>(&self, key: StorageKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.write_raw(key, &json),
            Err(err) => log::warn!("could not serialize slice {key}: {err}"),
        }
    }

    pub fn remove(&self, key: StorageKey) {
        if let Err(err) = self.backend.remove(key.as_str()) {
            log::warn!("storage delete failed for {key}: {err}");
        }
    }

    /// Remove every known key, continuing past individual failures.
    pub fn reset_all(&self) {
        for key in StorageKey::ALL {
            self.remove(key);
        }
        log::info!("cleared all persisted progress");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::KeyValueStore;

    #[derive(Debug, thiserror::Error)]
    #[error("storage disabled")]
    pub struct Disabled;

    /// Backend that fails every call, like storage disabled by the browser.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DisabledStore;

    impl KeyValueStore for DisabledStore {
        type Error = Disabled;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(Disabled)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(Disabled)
        }

        fn remove(&self, _key: &str) -> Result<(), Self::Error> {
            Err(Disabled)
        }
    }
}
