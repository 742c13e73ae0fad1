//! Authentication context and hooks for the UI.

use api::auth::{user_query_key, SessionState};
use api::{Client, UserInfo};
use dioxus::prelude::*;
use tokio::sync::broadcast::error::RecvError;

use crate::components::{Button, ButtonVariant, Spinner};
use crate::icons::FaRightFromBracket;
use crate::mutation::{use_google_mutation, use_sign_out_mutation};
use crate::query::Queries;
use crate::Icon;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl From<&SessionState> for AuthState {
    fn from(state: &SessionState) -> Self {
        Self {
            user: state.user().cloned(),
            loading: state.is_loading(),
        }
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// The backend client provided at the root of the app.
pub fn use_client() -> Client {
    use_context::<Client>()
}

/// Provider component that manages authentication state.
///
/// Restores the persisted session once, then follows the client's auth
/// events for the lifetime of the app. Requires a [`Client`] in context.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let client = use_client();
    let mut auth_state = use_signal(AuthState::default);
    let queries = try_use_context::<Queries>();

    use_future(move || {
        let client = client.clone();
        async move {
            // Subscribe first so the initial-session event is not missed.
            let mut events = client.subscribe();
            client.initialize().await;

            let mut session = SessionState::default();
            loop {
                match events.recv().await {
                    Ok(event) => {
                        tracing::info!("Auth event: {}", event.name());
                        session.apply(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {skipped} auth events, resyncing");
                        session = match client.session() {
                            Some(current) => SessionState::Authenticated(current.user),
                            None => SessionState::Unauthenticated,
                        };
                    }
                    Err(RecvError::Closed) => break,
                }

                let next = AuthState::from(&session);
                if *auth_state.peek() != next {
                    auth_state.set(next);
                }
                if let Some(mut queries) = queries {
                    queries.invalidate(&user_query_key());
                }
            }
        }
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

/// Renders `children` only for a signed-in user.
///
/// Shows a spinner while the session is being restored and sends everyone
/// else to `/sign-in`.
#[component]
pub fn ProtectedRoute(children: Element) -> Element {
    let auth = use_auth();
    let nav = use_navigator();

    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_none() {
            nav.replace("/sign-in");
        }
    });

    let state = auth();
    if state.loading {
        return rsx! {
            div { class: "page-center",
                Spinner {}
            }
        };
    }
    if state.user.is_none() {
        return rsx! {};
    }

    rsx! {
        {children}
    }
}

/// Starts Google sign-in and leaves the app for the provider.
#[component]
pub fn GoogleSignInButton(
    label: String,
    #[props(default)] disabled: bool,
    /// Receives the translated error when the flow cannot start.
    on_error: EventHandler<String>,
) -> Element {
    let google = use_google_mutation();

    let onclick = move |_| async move {
        if let Some(url) = google.mutate().await {
            crate::open_external(&url);
        } else if let Some(message) = google.state.error() {
            on_error.call(message);
        }
    };

    rsx! {
        Button {
            variant: ButtonVariant::Outline,
            class: "w-full",
            disabled: disabled || google.state.is_loading(),
            onclick: onclick,
            Icon {
                icon: dioxus_free_icons::icons::fa_brands_icons::FaGoogle,
                width: 16,
                height: 16,
            }
            if google.state.is_loading() {
                Spinner { small: true }
            } else {
                "{label}"
            }
        }
    }
}

/// Signs out, then returns to `/sign-in`.
#[component]
pub fn SignOutButton(label: String, #[props(default)] class: String) -> Element {
    let sign_out = use_sign_out_mutation();
    let nav = use_navigator();

    let onclick = move |_| async move {
        sign_out.mutate().await;
        nav.push("/sign-in");
    };

    rsx! {
        button {
            class: "sign-out-button {class}",
            disabled: sign_out.state.is_loading(),
            onclick: onclick,
            Icon { icon: FaRightFromBracket, width: 14, height: 14 }
            span { "{label}" }
        }
    }
}
