//! # Filesystem-backed key/value store
//!
//! [`FileStore`] persists every key into a single JSON object file. It is used on
//! desktop builds (and by `cargo test`) where there is no browser `localStorage`.
//!
//! ```text
//! <path>            # e.g. ~/.local/share/taskboard/storage.json
//! {"language-storage": "{\"state\":{\"language\":\"es\"},\"version\":0}", ...}
//! ```
//!
//! Use [`dirs::data_dir()`](https://docs.rs/dirs) to obtain a platform-appropriate
//! parent directory. A missing or corrupt file reads as empty; the next write
//! replaces it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::kv::KeyValueStore;

/// Single-file JSON KeyValueStore for native platforms.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable store {}: {e}", self.path.display());
            BTreeMap::new()
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(values) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!("Failed to write {}: {e}", self.path.display());
                }
            }
            Err(e) => tracing::warn!("Failed to encode store: {e}"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values);
    }

    fn remove(&self, key: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.read_all();
        if values.remove(key).is_some() {
            self.write_all(&values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::new(path.clone());
        store.set("sidebar-storage", "{\"state\":{\"isSidebarOpen\":false}}");
        store.set("i18nextLng", "es");

        // Re-open from the same file
        let reopened = FileStore::new(path);
        assert_eq!(reopened.get("i18nextLng").as_deref(), Some("es"));
        assert!(reopened.get("sidebar-storage").is_some());

        reopened.remove("i18nextLng");
        assert!(store.get("i18nextLng").is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(path);
        assert!(store.get("anything").is_none());

        store.set("anything", "value");
        assert_eq!(store.get("anything").as_deref(), Some("value"));
    }
}
