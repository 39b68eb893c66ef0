//! Distinct-id persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Storage key the distinct id persists under.
pub const DISTINCT_ID_KEY: &str = "distinct_id";

/// Synchronous key/value storage, the contract the tracker expects from the
/// host's persistence layer. Both operations must always be available;
/// implementations degrade internally rather than fail outward.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory storage. Every instance is its own scope, so each gets a fresh
/// distinct id; useful for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.into(), value.into());
    }
}

/// JSON-file-backed storage under the platform-local data directory.
///
/// Reads treat a missing or unreadable file as empty, and write failures are
/// logged and swallowed: a lost id only means a fresh one is generated next
/// run, never a host-visible error.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default store location, `<local data dir>/pagetrace/store.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagetrace")
            .join("store.json")
    }

    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), error = %err, "failed to create store directory");
                return;
            }
        }
        match serde_json::to_string_pretty(map) {
            Ok(content) => {
                if let Err(err) = std::fs::write(&self.path, content) {
                    warn!(path = %self.path.display(), error = %err, "failed to write store");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize store"),
        }
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.into(), value.into());
        self.write_map(&map);
    }
}

/// Read the persisted distinct id, generating and persisting a fresh random
/// one on first run. Idempotent within one storage scope.
pub fn ensure_distinct_id(store: &dyn Storage) -> String {
    if let Some(id) = store.get(DISTINCT_ID_KEY) {
        if !id.is_empty() {
            return id;
        }
    }
    let id = uuid::Uuid::new_v4().simple().to_string();
    store.set(DISTINCT_ID_KEY, &id);
    id
}
