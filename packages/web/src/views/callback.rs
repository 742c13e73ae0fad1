//! `/auth/callback`: where Google sign-in and email links land.

use std::time::Duration;

use api::auth::AuthRedirect;
use dioxus::prelude::*;
use ui::components::{Alert, AlertKind, Spinner};
use ui::{use_complete_redirect_mutation, use_i18n};

use super::AuthCard;
use crate::Route;

const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
enum CallbackStatus {
    Loading,
    Success(String),
    Error(String),
}

#[component]
pub fn AuthCallback() -> Element {
    let i18n = use_i18n();
    let nav = use_navigator();
    let complete = use_complete_redirect_mutation();
    let mut status = use_signal(|| CallbackStatus::Loading);

    use_future(move || async move {
        let redirect = match ui::current_url().map(|url| AuthRedirect::parse(&url)) {
            Some(Ok(redirect)) => redirect,
            Some(Err(e)) => {
                tracing::warn!("Unreadable callback URL: {e}");
                status.set(CallbackStatus::Error(i18n.t("auth.errors.unexpectedError")));
                return;
            }
            None => AuthRedirect::default(),
        };
        let from_link = redirect.tokens.is_some();

        let Some(outcome) = complete.mutate(redirect).await else {
            let message = complete
                .state
                .error()
                .unwrap_or_else(|| i18n.t("auth.errors.sessionError"));
            status.set(CallbackStatus::Error(message));
            return;
        };

        let key = if outcome.recovery {
            "auth.passwordResetLinkVerified"
        } else if from_link {
            "auth.emailVerifiedSuccess"
        } else {
            "auth.signedInSuccess"
        };
        status.set(CallbackStatus::Success(i18n.t(key)));

        ui::sleep(REDIRECT_DELAY).await;
        nav.push(outcome.destination());
    });

    rsx! {
        AuthCard {
            {match status() {
                CallbackStatus::Loading => rsx! {
                    div { class: "center stack",
                        Spinner {}
                        h2 { {i18n.t("auth.verifying")} }
                        p { class: "muted", {i18n.t("auth.verifyingEmail")} }
                    }
                },
                CallbackStatus::Success(message) => rsx! {
                    Alert { kind: AlertKind::Success, message: message }
                    Link { to: Route::Home {}, class: "link", {i18n.t("common.goToHome")} }
                },
                CallbackStatus::Error(message) => rsx! {
                    Alert { message: message }
                    Link { to: Route::SignIn {}, class: "link", {i18n.t("common.goToSignIn")} }
                },
            }}
        }
    }
}
