//! Platform key/value storage shared by every provider.
//!
//! - **Web** (WASM + `web` feature): `window.localStorage` via [`store::LocalStorage`]
//! - **Native**: one JSON file under the user data dir via [`store::FileStore`]

use std::sync::{Arc, OnceLock};

use store::KeyValueStore;

/// The process-wide key/value store. Every call returns the same instance, so
/// the session, language and sidebar preferences all land in one place.
pub fn make_kv_store() -> Arc<dyn KeyValueStore> {
    static STORE: OnceLock<Arc<dyn KeyValueStore>> = OnceLock::new();
    STORE.get_or_init(platform_store).clone()
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn platform_store() -> Arc<dyn KeyValueStore> {
    Arc::new(store::LocalStorage::new())
}

#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
fn platform_store() -> Arc<dyn KeyValueStore> {
    Arc::new(store::MemoryStore::new())
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_store() -> Arc<dyn KeyValueStore> {
    let path = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("taskboard")
        .join("storage.json");
    Arc::new(store::FileStore::new(path))
}

/// Sleep on whichever timer the platform has.
pub async fn sleep(duration: std::time::Duration) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;
}

/// Full-page navigation, used for provider redirects that leave the app.
pub fn open_external(url: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::error!("Failed to navigate to {url}: {e:?}");
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    tracing::info!("Open {url} in a browser to continue");
}

/// The URL the browser is currently showing, if there is one.
pub fn current_url() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().and_then(|w| w.location().href().ok())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}
