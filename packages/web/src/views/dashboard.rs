//! Account overview at `/dashboard`.

use dioxus::prelude::*;
use ui::icons::FaCircleCheck;
use ui::{
    use_i18n, use_sign_out_mutation, use_user_query, Icon, Layout, LoadingSkeleton,
    ProtectedRoute,
};

use crate::Route;

const GETTING_STARTED: [&str; 3] = [
    "dashboard.gettingStarted1",
    "dashboard.gettingStarted2",
    "dashboard.gettingStarted3",
];

#[component]
pub fn Dashboard() -> Element {
    rsx! {
        ProtectedRoute {
            AccountOverview {}
        }
    }
}

#[component]
fn AccountOverview() -> Element {
    let i18n = use_i18n();
    let nav = use_navigator();
    let user = use_user_query();
    let sign_out = use_sign_out_mutation();

    let not_available = i18n.t("common.notAvailable");
    let current = match &*user.read() {
        Some(Ok(user)) => user.clone(),
        Some(Err(e)) => {
            tracing::warn!("Failed to load user: {e}");
            None
        }
        None => {
            return rsx! {
                Layout {
                    user_email: None::<String>,
                    on_sign_out: move |_| {},
                    LoadingSkeleton {}
                }
            };
        }
    };

    let email = current
        .as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or_else(|| not_available.clone());
    let user_id = current
        .as_ref()
        .map(|u| u.id.to_string())
        .unwrap_or_else(|| not_available.clone());
    let verified = if current.as_ref().is_some_and(|u| u.is_email_verified()) {
        i18n.t("dashboard.yes")
    } else {
        i18n.t("dashboard.no")
    };
    let created = current
        .as_ref()
        .and_then(|u| u.created_at)
        .map(|at| i18n.date(at))
        .unwrap_or(not_available);

    rsx! {
        Layout {
            user_email: current.as_ref().and_then(|u| u.email.clone()),
            on_sign_out: move |_| async move {
                sign_out.mutate().await;
                nav.push(Route::SignIn {});
            },

            div { class: "page-heading",
                h1 { {i18n.t("dashboard.title")} }
                p { class: "muted", {i18n.t("dashboard.subtitle")} }
            }

            div { class: "stack-lg",
                section { class: "card",
                    h2 { {i18n.t("dashboard.quickStats")} }
                    p { {i18n.t("dashboard.dashboardDescription")} }
                    p { class: "muted", {i18n.t("dashboard.accountInfoDescription")} }
                }

                section { class: "card",
                    h2 { {i18n.t("dashboard.userInformation")} }
                    dl { class: "details",
                        dt { {i18n.t("dashboard.emailLabel")} }
                        dd { "{email}" }
                        dt { {i18n.t("dashboard.userId")} }
                        dd { code { "{user_id}" } }
                        dt { {i18n.t("dashboard.emailVerified")} }
                        dd { "{verified}" }
                        dt { {i18n.t("dashboard.accountCreated")} }
                        dd { "{created}" }
                    }
                }

                section { class: "card",
                    h2 { {i18n.t("dashboard.gettingStarted")} }
                    ul { class: "checklist",
                        for key in GETTING_STARTED {
                            li { key: "{key}",
                                Icon { icon: FaCircleCheck, width: 14, height: 14 }
                                span { {i18n.t(key)} }
                            }
                        }
                    }
                }
            }
        }
    }
}
