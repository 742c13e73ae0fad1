use dioxus::prelude::*;

#[component]
pub fn Spinner(#[props(default)] small: bool) -> Element {
    rsx! {
        span {
            class: if small { "spinner spinner-sm" } else { "spinner" },
            role: "status",
            aria_busy: true,
        }
    }
}
