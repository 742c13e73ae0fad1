//! # Translations
//!
//! Catalogues for every [`Language`] are embedded at compile time from
//! `locales/<code>.json` and flattened to dotted keys (`auth.errors.invalidEmail`).
//! Lookup falls back to English, then to the key itself, so a missing string
//! shows up as its key rather than as nothing.
//!
//! Placeholders use `{{name}}`:
//!
//! ```text
//! "createdOn": "Created {{date}}"   →   t_with("tasks.createdOn", &[("date", "10/15/2026")])
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use serde_json::Value;
use store::{KeyValueStore, Language, LanguageStore};

use crate::storage::make_kv_store;

type Catalogue = HashMap<String, String>;

static CATALOGUES: LazyLock<HashMap<Language, Catalogue>> = LazyLock::new(|| {
    Language::ALL
        .into_iter()
        .map(|language| (language, load(language)))
        .collect()
});

fn source(language: Language) -> &'static str {
    match language {
        Language::En => include_str!("locales/en.json"),
        Language::Es => include_str!("locales/es.json"),
    }
}

fn load(language: Language) -> Catalogue {
    match serde_json::from_str::<Value>(source(language)) {
        Ok(value) => {
            let mut catalogue = Catalogue::new();
            flatten("", &value, &mut catalogue);
            catalogue
        }
        Err(e) => {
            tracing::error!("Broken {} catalogue: {e}", language.code());
            Catalogue::new()
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Catalogue) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Look up `key` in `language`, then English, then return the key.
pub fn translate(language: Language, key: &str) -> String {
    CATALOGUES
        .get(&language)
        .and_then(|c| c.get(key))
        .or_else(|| CATALOGUES.get(&Language::En).and_then(|c| c.get(key)))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Replace each `{{name}}` in `text`.
pub fn interpolate(text: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(text.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{{{name}}}}}"), value)
    })
}

/// Short date in the order the language writes it.
pub fn format_date(language: Language, date: DateTime<Utc>) -> String {
    let pattern = match language {
        Language::En => "%m/%d/%Y",
        Language::Es => "%d/%m/%Y",
    };
    date.format(pattern).to_string()
}

/// Handle returned by [`use_i18n`]. Reading through it subscribes the
/// component to language changes.
#[derive(Clone, Copy)]
pub struct Translator {
    language: Signal<Language>,
    store: CopyValue<LanguageStore>,
}

impl Translator {
    pub fn language(&self) -> Language {
        (self.language)()
    }

    pub fn t(&self, key: &str) -> String {
        translate(self.language(), key)
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        interpolate(&self.t(key), vars)
    }

    pub fn date(&self, date: DateTime<Utc>) -> String {
        format_date(self.language(), date)
    }

    /// Switch language and persist the choice.
    pub fn set_language(&mut self, language: Language) {
        if *self.language.peek() == language {
            return;
        }
        tracing::info!("Switching language to {}", language.code());
        self.store.read().set(language);
        self.language.set(language);
    }
}

pub fn use_i18n() -> Translator {
    use_context::<Translator>()
}

/// Seeds the language from the persisted preference and provides a [`Translator`].
#[component]
pub fn I18nProvider(children: Element) -> Element {
    let store = use_hook(|| {
        let kv: Arc<dyn KeyValueStore> = make_kv_store();
        CopyValue::new(LanguageStore::new(kv))
    });
    let language = use_signal(|| store.read().initial());

    use_context_provider(|| Translator { language, store });

    rsx! {
        {children}
    }
}
