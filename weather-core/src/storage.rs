//! Durable key-value storage and the two dashboard keys kept in it.
//!
//! Reads are fail-soft: anything missing or unreadable becomes the documented
//! fallback. Writes log and swallow their errors.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::warn;

use crate::error::StorageError;

pub const HISTORY_KEY: &str = "weatherHistory";
pub const LAST_CITY_KEY: &str = "lastViewedCity";

/// Maximum number of cities kept in the search history.
pub const HISTORY_LIMIT: usize = 5;

const STORAGE_FILE: &str = "storage.json";

/// String-to-string storage, one value per key.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// All keys in a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `storage.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced; an unreadable one is left alone.
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Json(err)) => {
                warn!(error = %err, path = %self.path.display(), "replacing corrupt storage");
                HashMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the history list and the last viewed city.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persisted history, or an empty list.
    ///
    /// The result is normalised: blank names and repeats are dropped and the
    /// list is cut to [`HISTORY_LIMIT`].
    pub fn load_history(&self) -> Vec<String> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read search history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(names) => normalize_history(names),
            Err(err) => {
                warn!(error = %err, "stored search history is malformed, starting empty");
                Vec::new()
            }
        }
    }

    pub fn save_history(&self, history: &[String]) {
        let encoded = match serde_json::to_string(history) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "could not encode search history");
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &encoded) {
            warn!(error = %err, "could not persist search history");
        }
    }

    /// Last viewed city, or `None`.
    pub fn load_last_city(&self) -> Option<String> {
        match self.store.get(LAST_CITY_KEY) {
            Ok(city) => city.filter(|c| !c.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read last viewed city");
                None
            }
        }
    }

    pub fn save_last_city(&self, city: &str) {
        if let Err(err) = self.store.set(LAST_CITY_KEY, city) {
            warn!(error = %err, "could not persist last viewed city");
        }
    }
}

fn normalize_history(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(HISTORY_LIMIT);
    for name in names {
        if out.len() == HISTORY_LIMIT {
            break;
        }
        if !name.trim().is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
