//! Durable string key-value storage shared by the cache and preferences.

use common::errors::CacheError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

/// A string key-value store that outlives the process (or pretends to).
///
/// Calls are synchronous and preference writes happen inside a state
/// transition, so `snapshot()` and subscribers wait for `set` to return.
/// Implementations must not `.await` and should keep `set` short.
pub trait PersistentStore: Send + Sync {
    /// A name for logs.
    fn name(&self) -> &'static str;

    /// Return the stored value, `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store the value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Process-local store, forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let state = self
            .state
            .read()
            .map_err(|e| CacheError::unavailable(key, e.to_string()))?;
        Ok(state.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CacheError::unavailable(key, e.to_string()))?;
        state.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole map is kept in memory and the file is rewritten on every `set`.
/// The map holds cached forecast bundles next to the preferences, so a
/// favorite or unit change writes every cached bundle too. That write is
/// blocking file I/O on the calling thread, and for preference keys it runs
/// while the store's state transition is held. With a few dozen cached
/// cities this is well under a millisecond on local disk; hosts on slow or
/// network storage should prefer [`MemoryStore`] or their own implementation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the file at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let state: HashMap<String, String> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CacheError::unavailable(path.display().to_string(), e.to_string())),
        };

        info!(path = %path.display(), entries = state.len(), "Opened persistent store");

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    fn flush(&self, key: &str, state: &HashMap<String, String>) -> Result<(), CacheError> {
        let text = serde_json::to_string(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| CacheError::unavailable(key, e.to_string()))
    }
}

impl PersistentStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let state = self
            .state
            .read()
            .map_err(|e| CacheError::unavailable(key, e.to_string()))?;
        Ok(state.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CacheError::unavailable(key, e.to_string()))?;
        let previous = state.insert(key.to_string(), value.to_string());

        // Keep memory and disk in agreement when the write fails.
        if let Err(e) = self.flush(key, &state) {
            match previous {
                Some(old) => state.insert(key.to_string(), old),
                None => state.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
