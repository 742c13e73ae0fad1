use api::validation::RecoveryForm;
use dioxus::prelude::*;
use ui::components::{Alert, AlertKind, Button, ButtonVariant, Input, Label, Spinner};
use ui::{use_i18n, use_password_recovery_mutation};

use super::AuthCard;
use crate::Route;

#[component]
pub fn ForgotPassword() -> Element {
    let i18n = use_i18n();
    let recovery = use_password_recovery_mutation();

    let mut email = use_signal(String::new);
    let mut sent = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        sent.set(false);
        let form = RecoveryForm { email: email() };
        if recovery.mutate(form).await.is_some() {
            sent.set(true);
        }
    };

    let busy = recovery.state.is_loading();

    rsx! {
        AuthCard {
            title: i18n.t("auth.forgotPassword"),
            subtitle: i18n.t("auth.forgotPasswordSubtitle"),

            if sent() {
                Alert { kind: AlertKind::Success, message: i18n.t("auth.recoveryEmailSent") }
                div { class: "center",
                    Link { to: Route::SignIn {}, class: "link", {i18n.t("common.backToSignIn")} }
                }
            } else {
                if let Some(message) = recovery.state.error() {
                    Alert {
                        message: message,
                        dismiss_label: i18n.t("common.dismiss"),
                        on_dismiss: move |_| {
                            let mut state = recovery.state;
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
                    Button {
                        variant: ButtonVariant::Primary,
                        r#type: "submit",
                        class: "w-full",
                        disabled: busy,
                        if busy {
                            Spinner { small: true }
                        } else {
                            {i18n.t("auth.sendRecoveryEmail")}
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
