//! # `localStorage` key/value store
//!
//! [`LocalStorage`] is the [`KeyValueStore`] used on the **web platform**. It is a
//! zero-size handle that looks up `window.localStorage` on every call, so it is
//! `Send + Sync` and can live inside shared client state.
//!
//! All errors are swallowed: private browsing modes and disabled storage behave
//! as an empty store rather than breaking the UI.

use crate::kv::KeyValueStore;

/// Browser `localStorage`-backed KeyValueStore.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
