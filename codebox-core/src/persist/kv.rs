use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Synchronous string store the engine persists through. Reads never fail:
/// a missing or unreadable key is simply absent, and the consumer falls
/// back to its default value. Writes are best-effort.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// One file per key under a directory. Write failures are logged and
/// swallowed; losing a persistence write must never take the session down.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create store directory {dir:?}"))?;
        Ok(Self { dir })
    }

    /// Opens the store at the default location (~/.codebox/store).
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().context("failed to get home directory")?;
        Self::open(home.join(".codebox").join("store"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KvStore for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!("failed to persist '{key}': {e}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.path_for(key)) {
            if e.kind() != ErrorKind::NotFound {
                warn!("failed to remove '{key}': {e}");
            }
        }
    }
}

/// In-memory store for tests and hosts that manage persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn disk_store_round_trip() {
        let temp = tempdir().unwrap();
        let store = DiskStore::open(temp.path().to_path_buf()).unwrap();

        assert_eq!(store.get("workspace"), None);
        store.set("workspace", "{\"root\":{}}");
        assert_eq!(store.get("workspace"), Some("{\"root\":{}}".to_string()));

        store.remove("workspace");
        assert_eq!(store.get("workspace"), None);
    }

    #[test]
    fn disk_store_remove_missing_key_is_silent() {
        let temp = tempdir().unwrap();
        let store = DiskStore::open(temp.path().to_path_buf()).unwrap();
        store.remove("never_written");
    }

    #[test]
    fn disk_store_overwrites() {
        let temp = tempdir().unwrap();
        let store = DiskStore::open(temp.path().to_path_buf()).unwrap();
        store.set("layout", "a");
        store.set("layout", "b");
        assert_eq!(store.get("layout"), Some("b".to_string()));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set("tabs", "[]");
        assert_eq!(store.get("tabs"), Some("[]".to_string()));
        store.remove("tabs");
        assert_eq!(store.get("tabs"), None);
    }
}
