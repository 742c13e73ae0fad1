use dioxus::prelude::*;
use store::Language;

use crate::i18n::use_i18n;
use crate::icons::{FaChevronDown, FaRightFromBracket};
use crate::Icon;

/// Top bar with the app title, language picker and user menu.
/// `children` go before the title (the sidebar toggle).
#[component]
pub fn Header(
    user_email: Option<String>,
    on_sign_out: EventHandler<()>,
    children: Element,
) -> Element {
    let mut i18n = use_i18n();
    let mut menu_open = use_signal(|| false);

    rsx! {
        header { class: "header",
            div { class: "header-start",
                {children}
                h1 { class: "header-title", {i18n.t("common.dashboard")} }
            }
            div { class: "header-end",
                select {
                    class: "language-select",
                    aria_label: i18n.t("common.changeLanguage"),
                    value: i18n.language().code(),
                    onchange: move |evt| {
                        if let Some(language) = Language::from_code(&evt.value()) {
                            i18n.set_language(language);
                        }
                    },
                    option { value: "en", {i18n.t("common.english")} }
                    option { value: "es", {i18n.t("common.spanish")} }
                }
                if let Some(email) = user_email {
                    div { class: "user-menu",
                        button {
                            class: "user-menu-trigger",
                            r#type: "button",
                            aria_label: i18n.t("common.userMenu"),
                            aria_expanded: menu_open(),
                            onclick: move |_| menu_open.toggle(),
                            span { "{email}" }
                            Icon { icon: FaChevronDown, width: 10, height: 10 }
                        }
                        if menu_open() {
                            div { class: "user-menu-list", role: "menu",
                                button {
                                    class: "user-menu-item",
                                    r#type: "button",
                                    role: "menuitem",
                                    onclick: move |_| {
                                        menu_open.set(false);
                                        on_sign_out.call(());
                                    },
                                    Icon { icon: FaRightFromBracket, width: 12, height: 12 }
                                    span { {i18n.t("common.signOut")} }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
