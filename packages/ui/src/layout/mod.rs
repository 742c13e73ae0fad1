//! Page chrome: header, collapsible sidebar and the loading skeleton.
//!
//! The sidebar's open state persists through [`store::SidebarStore`], so a
//! collapsed sidebar stays collapsed across reloads.

mod header;
mod sidebar;
mod skeleton;

pub use header::Header;
pub use sidebar::{default_sidebar_items, Sidebar, SidebarItem};
pub use skeleton::LoadingSkeleton;

use dioxus::prelude::*;
use store::SidebarStore;

use crate::i18n::use_i18n;
use crate::icons::FaBars;
use crate::storage::make_kv_store;
use crate::Icon;

#[component]
pub fn Layout(
    user_email: Option<String>,
    on_sign_out: EventHandler<()>,
    /// Defaults to [`default_sidebar_items`].
    #[props(default)]
    sidebar_items: Option<Vec<SidebarItem>>,
    #[props(default = true)] show_sidebar: bool,
    children: Element,
) -> Element {
    let i18n = use_i18n();
    let store = use_hook(|| CopyValue::new(SidebarStore::new(make_kv_store())));
    let mut open = use_signal(|| store.read().is_open());

    let items = sidebar_items.unwrap_or_else(|| default_sidebar_items(&i18n));

    rsx! {
        div { class: "layout",
            Header {
                user_email: user_email,
                on_sign_out: on_sign_out,
                if show_sidebar {
                    button {
                        class: "icon-button",
                        r#type: "button",
                        aria_label: i18n.t("common.toggleSidebar"),
                        onclick: move |_| open.set(store.read().toggle()),
                        Icon { icon: FaBars, width: 16, height: 16 }
                    }
                }
            }
            div { class: "layout-body",
                if show_sidebar {
                    Sidebar {
                        items: items,
                        open: open(),
                        on_close: move |_| {
                            store.read().close();
                            open.set(false);
                        },
                    }
                }
                main { class: "layout-main", {children} }
            }
        }
    }
}
