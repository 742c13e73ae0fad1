use dioxus::prelude::*;

use api::{BackendConfig, Client};
use ui::{AuthProvider, I18nProvider, QueryProvider};
use views::{AuthCallback, Dashboard, ForgotPassword, Home, NotFound, ResetPassword, SignIn, SignUp};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Home {},
    #[route("/dashboard")]
    Dashboard {},
    #[route("/sign-in")]
    SignIn {},
    #[route("/sign-up")]
    SignUp {},
    #[route("/forgot-password")]
    ForgotPassword {},
    #[route("/reset-password")]
    ResetPassword {},
    #[route("/auth/callback")]
    AuthCallback {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(BackendConfig::from_env);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return rsx! {
                document::Link { rel: "stylesheet", href: ui::UI_CSS }
                document::Link { rel: "stylesheet", href: MAIN_CSS }
                I18nProvider {
                    views::ConfigError { details: e.to_string() }
                }
            };
        }
    };

    use_context_provider(|| Client::from_config(config.clone(), ui::make_kv_store()));
    use_context_provider(|| config);

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: ui::UI_CSS }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        I18nProvider {
            QueryProvider {
                AuthProvider {
                    Router::<Route> {}
                }
            }
        }
    }
}
