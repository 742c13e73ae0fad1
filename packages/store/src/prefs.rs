//! # Persisted UI preferences: language and sidebar
//!
//! Two tiny stores sit on top of a [`KeyValueStore`]. Each writes a JSON envelope
//! under a fixed key:
//!
//! ```json
//! { "state": { "language": "es" }, "version": 0 }
//! ```
//!
//! | Store | Key | State | Default |
//! |-------|-----|-------|---------|
//! | [`LanguageStore`] | `language-storage` | `{ "language": "en" \| "es" }` | `en` |
//! | [`SidebarStore`] | `sidebar-storage` | `{ "isSidebarOpen": bool }` | open |
//!
//! The language store also mirrors the choice into the legacy `i18nextLng` key and
//! reads it back when the envelope is missing, so a language picked before the
//! envelope existed is still honoured.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kv::{get_json, set_json, KeyValueStore};

pub const LANGUAGE_KEY: &str = "language-storage";
pub const LEGACY_LANGUAGE_KEY: &str = "i18nextLng";
pub const SIDEBAR_KEY: &str = "sidebar-storage";

/// Supported UI languages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Persisted<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

impl<T> Persisted<T> {
    fn new(state: T) -> Self {
        Self { state, version: 0 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguageState {
    language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
struct SidebarState {
    #[serde(rename = "isSidebarOpen", default = "default_sidebar_open")]
    is_sidebar_open: bool,
}

fn default_sidebar_open() -> bool {
    true
}

/// Persisted language preference.
#[derive(Clone)]
pub struct LanguageStore {
    store: Arc<dyn KeyValueStore>,
}

impl LanguageStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Resolve the language to start with: the persisted envelope, then the
    /// legacy key, then English.
    pub fn initial(&self) -> Language {
        if let Some(persisted) = get_json::<Persisted<LanguageState>>(&*self.store, LANGUAGE_KEY) {
            return persisted.state.language;
        }
        self.store
            .get(LEGACY_LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default()
    }

    pub fn set(&self, language: Language) {
        set_json(
            &*self.store,
            LANGUAGE_KEY,
            &Persisted::new(LanguageState { language }),
        );
        self.store.set(LEGACY_LANGUAGE_KEY, language.code());
    }
}

/// Persisted sidebar open/closed state.
#[derive(Clone)]
pub struct SidebarStore {
    store: Arc<dyn KeyValueStore>,
}

impl SidebarStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn is_open(&self) -> bool {
        get_json::<Persisted<SidebarState>>(&*self.store, SIDEBAR_KEY)
            .map(|p| p.state.is_sidebar_open)
            .unwrap_or_else(default_sidebar_open)
    }

    pub fn set_open(&self, open: bool) {
        set_json(
            &*self.store,
            SIDEBAR_KEY,
            &Persisted::new(SidebarState {
                is_sidebar_open: open,
            }),
        );
    }

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    /// Flip the state and return the new value.
    pub fn toggle(&self) -> bool {
        let open = !self.is_open();
        self.set_open(open);
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn stores() -> (MemoryStore, Arc<dyn KeyValueStore>) {
        let memory = MemoryStore::new();
        let shared: Arc<dyn KeyValueStore> = Arc::new(memory.clone());
        (memory, shared)
    }

    #[test]
    fn test_language_defaults_to_english() {
        let (_, shared) = stores();
        assert_eq!(LanguageStore::new(shared).initial(), Language::En);
    }

    #[test]
    fn test_language_set_writes_envelope_and_legacy_key() {
        let (memory, shared) = stores();
        let languages = LanguageStore::new(shared);

        languages.set(Language::Es);

        assert_eq!(languages.initial(), Language::Es);
        assert_eq!(memory.get(LEGACY_LANGUAGE_KEY).as_deref(), Some("es"));
        let raw = memory.get(LANGUAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["language"], "es");
        assert_eq!(value["version"], 0);
    }

    #[test]
    fn test_language_falls_back_to_legacy_key() {
        let (memory, shared) = stores();
        memory.set(LEGACY_LANGUAGE_KEY, "es");
        assert_eq!(LanguageStore::new(shared).initial(), Language::Es);
    }

    #[test]
    fn test_language_ignores_unknown_values() {
        let (memory, shared) = stores();
        memory.set(LANGUAGE_KEY, r#"{"state":{"language":"fr"},"version":0}"#);
        memory.set(LEGACY_LANGUAGE_KEY, "de");
        assert_eq!(LanguageStore::new(shared).initial(), Language::En);
    }

    #[test]
    fn test_language_envelope_wins_over_legacy_key() {
        let (memory, shared) = stores();
        memory.set(LANGUAGE_KEY, r#"{"state":{"language":"en"}}"#);
        memory.set(LEGACY_LANGUAGE_KEY, "es");
        assert_eq!(LanguageStore::new(shared).initial(), Language::En);
    }

    #[test]
    fn test_sidebar_defaults_open_and_toggles() {
        let (memory, shared) = stores();
        let sidebar = SidebarStore::new(shared);

        assert!(sidebar.is_open());
        assert!(!sidebar.toggle());
        assert!(!sidebar.is_open());
        assert!(memory.get(SIDEBAR_KEY).unwrap().contains("\"isSidebarOpen\":false"));

        sidebar.open();
        assert!(sidebar.is_open());
        sidebar.close();
        assert!(!sidebar.is_open());
    }

    #[test]
    fn test_language_codes() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()), Some(language));
        }
        assert_eq!(Language::from_code("fr"), None);
    }
}
