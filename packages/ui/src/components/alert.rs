use dioxus::prelude::*;

use crate::icons::{FaCircleCheck, FaCircleExclamation, FaXmark};
use crate::Icon;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AlertKind {
    #[default]
    Error,
    Success,
}

/// Banner for one message. Shows a close button when `on_dismiss` is set.
#[component]
pub fn Alert(
    #[props(default)] kind: AlertKind,
    #[props(default)] title: Option<String>,
    message: String,
    #[props(default)] dismiss_label: String,
    on_dismiss: Option<EventHandler<()>>,
) -> Element {
    let class = match kind {
        AlertKind::Error => "alert alert-error",
        AlertKind::Success => "alert alert-success",
    };

    rsx! {
        div { class: class, role: "alert",
            span { class: "alert-icon",
                if kind == AlertKind::Success {
                    Icon { icon: FaCircleCheck, width: 16, height: 16 }
                } else {
                    Icon { icon: FaCircleExclamation, width: 16, height: 16 }
                }
            }
            div { class: "alert-content",
                if let Some(title) = title {
                    p { class: "alert-title", "{title}" }
                }
                p { class: "alert-message", "{message}" }
            }
            if let Some(handler) = on_dismiss {
                button {
                    class: "alert-dismiss",
                    r#type: "button",
                    aria_label: "{dismiss_label}",
                    onclick: move |_| handler.call(()),
                    Icon { icon: FaXmark, width: 12, height: 12 }
                }
            }
        }
    }
}
