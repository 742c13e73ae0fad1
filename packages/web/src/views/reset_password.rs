//! Reset-password page, reached from a recovery email.
//!
//! On load the page adopts the recovery tokens in the URL (or falls back to an
//! existing session). The form is only usable once a session is confirmed.

use std::time::Duration;

use api::auth::AuthRedirect;
use api::validation::ResetPasswordForm;
use dioxus::prelude::*;
use ui::components::{Alert, AlertKind, Button, ButtonVariant, Input, Label, Spinner};
use ui::{use_client, use_complete_redirect_mutation, use_i18n, use_reset_password_mutation};

use super::AuthCard;
use crate::Route;

const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
enum LinkStatus {
    Checking,
    Valid,
    Invalid(String),
}

#[component]
pub fn ResetPassword() -> Element {
    let i18n = use_i18n();
    let nav = use_navigator();
    let client = use_client();
    let complete = use_complete_redirect_mutation();
    let reset = use_reset_password_mutation();

    let mut status = use_signal(|| LinkStatus::Checking);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut success = use_signal(|| false);

    use_future(move || {
        let client = client.clone();
        async move {
            let redirect = ui::current_url()
                .and_then(|url| AuthRedirect::parse(&url).ok())
                .unwrap_or_default();

            let next = if redirect.tokens.is_some() || redirect.code.is_some() {
                match complete.mutate(redirect).await {
                    Some(_) => LinkStatus::Valid,
                    None => LinkStatus::Invalid(i18n.t("auth.errors.invalidResetLink")),
                }
            } else {
                match client.get_session().await {
                    Ok(Some(_)) => LinkStatus::Valid,
                    Ok(None) => LinkStatus::Invalid(i18n.t("auth.errors.noValidSession")),
                    Err(e) => {
                        tracing::warn!("Session check failed: {e}");
                        LinkStatus::Invalid(i18n.t("auth.errors.sessionValidationFailed"))
                    }
                }
            };
            status.set(next);
        }
    });

    let handle_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        let form = ResetPasswordForm {
            password: password(),
            confirm_password: confirm_password(),
        };
        // Form errors first, then the missing session.
        if status() != LinkStatus::Valid && form.validate().is_ok() {
            let mut state = reset.state;
            state.set_error(i18n.t("auth.errors.noSession"));
            return;
        }
        if reset.mutate(form).await.is_some() {
            success.set(true);
            ui::sleep(REDIRECT_DELAY).await;
            nav.push(Route::SignIn {});
        }
    };

    let link_error = match status() {
        LinkStatus::Checking => {
            return rsx! {
                AuthCard {
                    div { class: "center stack",
                        Spinner {}
                        p { class: "muted", {i18n.t("auth.validatingResetLink")} }
                    }
                }
            };
        }
        LinkStatus::Valid => None,
        LinkStatus::Invalid(message) => Some(message),
    };

    let busy = reset.state.is_loading();
    let mismatch = !confirm_password().is_empty() && password() != confirm_password();
    let error = reset.state.error().or(link_error);

    rsx! {
        AuthCard {
            title: i18n.t("auth.resetPassword"),
            subtitle: i18n.t("auth.resetPasswordSubtitle"),

            if let Some(message) = error {
                Alert { message: message }
            }

            if success() {
                Alert { kind: AlertKind::Success, message: i18n.t("auth.passwordResetSuccess") }
                div { class: "center",
                    Link { to: Route::SignIn {}, class: "link", {i18n.t("common.goToSignIn")} }
                }
            } else {
                form { class: "stack", onsubmit: handle_submit,
                    div {
                        Label { html_for: "new-password", {i18n.t("common.newPassword")} }
                        Input {
                            id: "new-password",
                            r#type: "password",
                            autocomplete: "new-password",
                            placeholder: i18n.t("auth.enterNewPassword"),
                            value: password(),
                            disabled: busy,
                            oninput: move |evt: FormEvent| password.set(evt.value()),
                        }
                        p { class: "hint", {i18n.t("auth.passwordMinLength")} }
                    }
                    div {
                        Label { html_for: "confirm-new-password",
                            {i18n.t("common.confirmNewPassword")}
                        }
                        Input {
                            id: "confirm-new-password",
                            r#type: "password",
                            autocomplete: "new-password",
                            placeholder: i18n.t("auth.confirmNewPasswordPlaceholder"),
                            value: confirm_password(),
                            disabled: busy,
                            invalid: mismatch,
                            oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                        }
                    }
                    Button {
                        variant: ButtonVariant::Primary,
                        r#type: "submit",
                        class: "w-full",
                        disabled: busy || status() != LinkStatus::Valid,
                        if busy {
                            Spinner { small: true }
                        } else {
                            {i18n.t("auth.resetPassword")}
                        }
                    }
                }

                p { class: "auth-footer",
                    {i18n.t("auth.rememberPassword")}
                    " "
                    Link { to: Route::SignIn {}, class: "link", {i18n.t("common.signIn")} }
                }
            }
        }
    }
}
