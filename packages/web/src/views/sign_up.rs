use std::time::Duration;

use api::validation::SignUpForm;
use dioxus::prelude::*;
use ui::components::{Alert, AlertKind, Button, ButtonVariant, Input, Label, Spinner};
use ui::{use_i18n, use_sign_up_mutation};

use super::AuthCard;
use crate::Route;

const REDIRECT_DELAY: Duration = Duration::from_secs(3);

#[component]
pub fn SignUp() -> Element {
    let i18n = use_i18n();
    let nav = use_navigator();
    let sign_up = use_sign_up_mutation();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut success = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        success.set(false);
        let form = SignUpForm {
            email: email(),
            password: password(),
            confirm_password: confirm_password(),
        };
        if let Some(outcome) = sign_up.mutate(form).await {
            if outcome.needs_confirmation() {
                tracing::info!("Sign-up pending email confirmation");
            }
            success.set(true);
            ui::sleep(REDIRECT_DELAY).await;
            nav.push(Route::SignIn {});
        }
    };

    if success() {
        return rsx! {
            AuthCard {
                Alert { kind: AlertKind::Success, message: i18n.t("auth.emailVerificationSuccess") }
                Link { to: Route::SignIn {}, class: "link", {i18n.t("common.goToSignIn")} }
            }
        };
    }

    let busy = sign_up.state.is_loading();

    rsx! {
        AuthCard {
            title: i18n.t("auth.signUpTitle"),
            subtitle: i18n.t("auth.signUpSubtitle"),

            if let Some(message) = sign_up.state.error() {
                Alert {
                    message: message,
                    dismiss_label: i18n.t("common.dismiss"),
                    on_dismiss: move |_| {
                        let mut state = sign_up.state;
                        state.clear_error();
                    },
                }
            }

            form { class: "stack", onsubmit: handle_submit,
                div {
                    Label { html_for: "email", {i18n.t("common.email")} }
                    Input {
                        id: "email",
                        r#type: "email",
                        autocomplete: "email",
                        placeholder: i18n.t("auth.enterEmail"),
                        value: email(),
                        disabled: busy,
                        oninput: move |evt: FormEvent| email.set(evt.value()),
                    }
                }
                div {
                    Label { html_for: "password", {i18n.t("common.password")} }
                    Input {
                        id: "password",
                        r#type: "password",
                        autocomplete: "new-password",
                        placeholder: i18n.t("auth.enterPasswordMin"),
                        value: password(),
                        disabled: busy,
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }
                    p { class: "hint", {i18n.t("auth.passwordMinLength")} }
                }
                div {
                    Label { html_for: "confirm-password", {i18n.t("common.confirmPassword")} }
                    Input {
                        id: "confirm-password",
                        r#type: "password",
                        autocomplete: "new-password",
                        placeholder: i18n.t("auth.confirmYourPassword"),
                        value: confirm_password(),
                        disabled: busy,
                        invalid: !confirm_password().is_empty() && password() != confirm_password(),
                        oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                    }
                }
                Button {
                    variant: ButtonVariant::Primary,
                    r#type: "submit",
                    class: "w-full",
                    disabled: busy,
                    if busy {
                        Spinner { small: true }
                    } else {
                        {i18n.t("common.signUp")}
                    }
                }
            }

            p { class: "auth-footer",
                {i18n.t("auth.alreadyHaveAccount")}
                " "
                Link { to: Route::SignIn {}, class: "link", {i18n.t("common.signIn")} }
            }
        }
    }
}
