use dioxus::prelude::*;

#[component]
pub fn Input(
    #[props(default)] id: String,
    #[props(default = "text".to_string())] r#type: String,
    #[props(default)] placeholder: String,
    #[props(default)] value: String,
    #[props(default)] disabled: bool,
    #[props(default)] invalid: bool,
    #[props(default = "off".to_string())] autocomplete: String,
    #[props(default)] class: String,
    oninput: EventHandler<FormEvent>,
) -> Element {
    let state = if invalid { "input input-invalid" } else { "input" };
    rsx! {
        input {
            id: "{id}",
            class: "{state} {class}",
            r#type: "{r#type}",
            placeholder: "{placeholder}",
            value: "{value}",
            disabled: disabled,
            autocomplete: "{autocomplete}",
            aria_invalid: invalid,
            oninput: move |evt| oninput.call(evt),
        }
    }
}

#[component]
pub fn Label(html_for: String, children: Element) -> Element {
    rsx! {
        label { class: "label", r#for: "{html_for}", {children} }
    }
}
