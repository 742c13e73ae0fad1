use dioxus::prelude::*;

use crate::i18n::Translator;
use crate::icons::FaXmark;
use crate::Icon;

#[derive(Clone, Debug, PartialEq)]
pub struct SidebarItem {
    pub label: String,
    pub href: String,
}

impl SidebarItem {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Dashboard, profile and settings.
pub fn default_sidebar_items(i18n: &Translator) -> Vec<SidebarItem> {
    vec![
        SidebarItem::new(i18n.t("common.dashboard"), "/dashboard"),
        SidebarItem::new(i18n.t("common.profile"), "/dashboard/profile"),
        SidebarItem::new(i18n.t("common.settings"), "/dashboard/settings"),
    ]
}

/// Navigation column. Renders nothing while closed; the item matching the
/// current route gets the `active` class.
#[component]
pub fn Sidebar(items: Vec<SidebarItem>, open: bool, on_close: EventHandler<()>) -> Element {
    let i18n = crate::i18n::use_i18n();

    if !open {
        return rsx! {};
    }

    rsx! {
        aside { class: "sidebar",
            div { class: "sidebar-header",
                span { class: "sidebar-title", {i18n.t("common.appName")} }
                button {
                    class: "icon-button",
                    r#type: "button",
                    aria_label: i18n.t("common.closeSidebar"),
                    onclick: move |_| on_close.call(()),
                    Icon { icon: FaXmark, width: 14, height: 14 }
                }
            }
            nav { class: "sidebar-nav",
                for item in items {
                    Link {
                        key: "{item.href}",
                        to: item.href.clone(),
                        class: "sidebar-item",
                        active_class: "active",
                        "{item.label}"
                    }
                }
            }
        }
    }
}
