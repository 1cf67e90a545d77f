//! Recently searched cities, persisted through a small key-value store.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::StorageError;

/// Storage key holding the JSON-encoded history list.
pub const HISTORY_KEY: &str = "weather_history";

pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Minimal persistent string storage, one value per key.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns `None` when the key is absent or the storage can't be read.
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keeps each key as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Failed to read {}: {}", path.display(), err);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Most-recent-first list of city names, unique ignoring case.
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
    cap: usize,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_cap(store, DEFAULT_MAX_HISTORY)
    }

    /// A cap of zero is raised to one.
    pub fn with_cap(store: S, cap: usize) -> Self {
        Self {
            store,
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Stored entries; empty when nothing was saved or the data is unreadable.
    pub fn list(&self) -> Vec<String> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Ignoring unreadable search history: {}", err);
                Vec::new()
            }
        }
    }

    /// Move `city` to the front, dropping any other spelling of it.
    pub fn record(&mut self, city: &str) -> Result<(), StorageError> {
        let needle = city.to_lowercase();
        let mut entries = self.list();
        entries.retain(|existing| existing.to_lowercase() != needle);
        entries.insert(0, city.to_string());
        entries.truncate(self.cap);

        let encoded = serde_json::to_string(&entries).map_err(|source| StorageError::Encode {
            key: HISTORY_KEY.to_string(),
            source,
        })?;
        self.store.set(HISTORY_KEY, &encoded)?;

        debug!("Recorded '{}' in history ({} entries)", city, entries.len());
        Ok(())
    }
}
