pub mod kv;
pub mod prefs;
pub mod query;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local::LocalStorage;

pub use kv::KeyValueStore;
pub use prefs::{Language, LanguageStore, SidebarStore};
pub use query::{QueryClient, QueryKey, QueryOptions};
