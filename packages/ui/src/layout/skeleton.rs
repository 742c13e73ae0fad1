use dioxus::prelude::*;

/// Placeholder blocks shown while a page's data loads.
#[component]
pub fn LoadingSkeleton(
    #[props(default = true)] show_header: bool,
    #[props(default = true)] show_cards: bool,
    #[props(default = 3)] card_count: usize,
) -> Element {
    rsx! {
        div { class: "skeleton-page", aria_busy: true,
            if show_header {
                div { class: "skeleton-header",
                    div { class: "skeleton skeleton-title" }
                    div { class: "skeleton skeleton-line" }
                }
            }
            if show_cards {
                div { class: "skeleton-cards",
                    for index in 0..card_count {
                        div { key: "{index}", class: "card",
                            div { class: "skeleton-card-header",
                                div { class: "skeleton skeleton-circle" }
                                div { class: "skeleton skeleton-line" }
                            }
                            div { class: "skeleton skeleton-text" }
                            div { class: "skeleton skeleton-text" }
                            div { class: "skeleton skeleton-text short" }
                        }
                    }
                }
            }
            div { class: "skeleton skeleton-block" }
        }
    }
}
