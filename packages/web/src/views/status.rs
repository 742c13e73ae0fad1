use dioxus::prelude::*;
use ui::use_i18n;

use crate::Route;

/// Shown instead of the app when the backend is not configured.
#[component]
pub fn ConfigError(details: String) -> Element {
    let i18n = use_i18n();

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                ui::components::Alert {
                    title: i18n.t("common.configurationError"),
                    message: i18n.t("common.configurationErrorDescription"),
                }
                pre { class: "config-details", "{details}" }
            }
        }
    }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let i18n = use_i18n();
    let path = segments.join("/");

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h1 { "404" }
                p { class: "muted", "/{path}" }
                Link { to: Route::Home {}, {i18n.t("common.goToHome")} }
            }
        }
    }
}
