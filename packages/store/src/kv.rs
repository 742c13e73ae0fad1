//! # Key/value storage: the persistence seam for client state
//!
//! Everything the client persists between visits goes through [`KeyValueStore`]:
//! the two preference stores in [`crate::prefs`] and the backend session kept by
//! `api::Client`. The trait is deliberately the shape of the browser's
//! `localStorage` (string keys, string values, synchronous, last write wins) so
//! the web implementation is a direct mapping.
//!
//! | Implementation | Platform | Notes |
//! |----------------|----------|-------|
//! | [`crate::MemoryStore`] | all | process-local, used by tests and as a fallback |
//! | [`crate::FileStore`] | native | one JSON object file |
//! | [`crate::LocalStorage`] | wasm + `web` | `window.localStorage` |
//!
//! Implementations never surface errors. An unavailable backing store behaves
//! as an empty one; callers always have a default to fall back on.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Synchronous string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Read and decode a JSON value. Missing keys and malformed JSON both read as `None`.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed value under {key}: {e}");
            None
        }
    }
}

/// Encode and write a JSON value.
pub fn set_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => tracing::warn!("Failed to encode value for {key}: {e}"),
    }
}
