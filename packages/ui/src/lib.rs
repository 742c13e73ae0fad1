//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

pub mod components;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod storage;
pub use storage::{current_url, make_kv_store, open_external, sleep};

pub const UI_CSS: Asset = asset!("/assets/ui.css");

mod auth;
pub use auth::{
    use_auth, use_client, AuthProvider, AuthState, GoogleSignInButton, ProtectedRoute,
    SignOutButton,
};

pub mod i18n;
pub use i18n::{use_i18n, I18nProvider, Translator};

mod query;
pub use query::{
    invalidate_queries, use_dashboard_tasks, use_queries, use_user_query, Queries, QueryProvider,
};

pub mod mutation;
pub use mutation::{
    use_complete_redirect_mutation, use_create_task_mutation, use_google_mutation, use_mutation,
    use_password_recovery_mutation, use_reset_password_mutation, use_sign_in_mutation,
    use_sign_out_mutation, use_sign_up_mutation, use_update_task_mutation, Mutation,
};

pub mod layout;
pub use layout::{Header, Layout, LoadingSkeleton, Sidebar, SidebarItem};

mod tasks;
pub use tasks::{title_after_create, CreateTaskForm, TaskItem, TaskList};
