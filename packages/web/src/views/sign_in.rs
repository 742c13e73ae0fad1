//! Sign-in page: email/password plus Google.

use api::validation::SignInForm;
use dioxus::prelude::*;
use ui::components::{Alert, Button, ButtonVariant, Input, Label, Spinner};
use ui::{use_auth, use_i18n, use_sign_in_mutation, GoogleSignInButton};

use super::AuthCard;
use crate::Route;

#[component]
pub fn SignIn() -> Element {
    let i18n = use_i18n();
    let auth = use_auth();
    let nav = use_navigator();
    let sign_in = use_sign_in_mutation();
    let mut google_error = use_signal(|| Option::<String>::None);

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);

    // Already signed in: go straight to the tasks.
    use_effect(move || {
        if auth().user.is_some() {
            nav.replace(Route::Home {});
        }
    });

    let handle_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        google_error.set(None);
        let form = SignInForm {
            email: email(),
            password: password(),
        };
        if sign_in.mutate(form).await.is_some() {
            nav.push(Route::Home {});
        }
    };

    let busy = sign_in.state.is_loading();
    let error = sign_in.state.error().or(google_error());

    rsx! {
        AuthCard {
            title: i18n.t("auth.signInTitle"),
            subtitle: i18n.t("auth.signInSubtitle"),

            if let Some(message) = error {
                Alert {
                    message: message,
                    dismiss_label: i18n.t("common.dismiss"),
                    on_dismiss: move |_| {
                        let mut state = sign_in.state;
                        state.clear_error();
                        google_error.set(None);
                    },
                }
            }

            GoogleSignInButton {
                label: i18n.t("auth.continueWithGoogle"),
                disabled: busy,
                on_error: move |message| google_error.set(Some(message)),
            }

            div { class: "divider", span { {i18n.t("common.or")} } }

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
                        autocomplete: "current-password",
                        placeholder: i18n.t("auth.enterPassword"),
                        value: password(),
                        disabled: busy,
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }
                }
                div { class: "align-end",
                    Link { to: Route::ForgotPassword {}, class: "link small",
                        {i18n.t("auth.forgotPasswordLink")}
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
                        {i18n.t("common.signIn")}
                    }
                }
            }

            p { class: "auth-footer",
                {i18n.t("auth.dontHaveAccount")}
                " "
                Link { to: Route::SignUp {}, class: "link", {i18n.t("common.signUp")} }
            }
        }
    }
}
