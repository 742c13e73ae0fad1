//! # API crate: backend access for the Taskboard frontends
//!
//! Everything that talks to the hosted backend lives here, independent of any
//! UI framework. The `ui` crate wraps these functions in hooks and the
//! `functions` crate reuses the backend seam for its request handler.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Password and Google sign-in, sign-up/out, recovery, reset, redirects |
//! | [`backend`] | The [`Backend`] trait: one method per remote call |
//! | [`client`] | [`Client`]: current session, persistence, auth events |
//! | [`config`] | [`BackendConfig`] from the environment |
//! | [`error`] | [`ApiError`] |
//! | [`models`] | Users, sessions, tasks |
//! | [`tasks`] | Task list query and task mutations |
//! | [`validation`] | Form rules shared by every auth form |
//!
//! Backends: [`SupabaseBackend`] (HTTP) and [`MemoryBackend`] (in-process).
//!
//! ## Control flow
//!
//! A form calls a mutation (`auth::sign_in`, `tasks::create_task`, ...). The
//! mutation validates, makes one backend call through the [`Client`], and on
//! success invalidates the affected [`store::QueryKey`]. Query hooks watching
//! the cache revision then refetch.

pub mod auth;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod validation;

mod memory;
mod supabase;

pub use backend::Backend;
pub use client::{AuthEvent, Client, RedirectTokens, CODE_VERIFIER_KEY, SESSION_KEY};
pub use config::BackendConfig;
pub use error::ApiError;
pub use memory::MemoryBackend;
pub use models::{
    OAuthProvider, Session, SignUpOutcome, Task, TaskInsert, TaskStats, TaskUpdate, UserInfo,
};
pub use supabase::SupabaseBackend;
pub use validation::ValidationError;
