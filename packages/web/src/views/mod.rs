use dioxus::prelude::*;

mod callback;
mod dashboard;
mod forgot_password;
mod home;
mod reset_password;
mod sign_in;
mod sign_up;
mod status;

pub use callback::AuthCallback;
pub use dashboard::Dashboard;
pub use forgot_password::ForgotPassword;
pub use home::Home;
pub use reset_password::ResetPassword;
pub use sign_in::SignIn;
pub use sign_up::SignUp;
pub use status::{ConfigError, NotFound};

/// Centered card used by every sign-in style page.
#[component]
fn AuthCard(
    #[props(default)] title: Option<String>,
    #[props(default)] subtitle: Option<String>,
    children: Element,
) -> Element {
    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                if title.is_some() || subtitle.is_some() {
                    div { class: "auth-card-heading",
                        if let Some(title) = title {
                            h1 { "{title}" }
                        }
                        if let Some(subtitle) = subtitle {
                            p { class: "muted", "{subtitle}" }
                        }
                    }
                }
                {children}
            }
        }
    }
}
