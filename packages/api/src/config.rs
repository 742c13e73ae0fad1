//! Backend configuration from environment variables.
//!
//! Native builds load `.env` through `dotenvy` and read the process
//! environment. Browser builds have no environment at runtime, so the same
//! variables are captured when the crate is compiled.

use crate::error::ApiError;

pub const DEFAULT_APP_URL: &str = "http://localhost:8080";

/// Where the hosted backend lives and how the app is reachable for redirects.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co` (no trailing slash).
    pub url: String,
    /// Public anonymous key sent as `apikey` on every request.
    pub anon_key: String,
    /// Public origin of the web app, used to build auth redirect URLs.
    pub app_url: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = app_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional `APP_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            dotenvy::dotenv().ok();
            Self::from_values(
                std::env::var("SUPABASE_URL").ok(),
                std::env::var("SUPABASE_ANON_KEY").ok(),
                std::env::var("APP_URL").ok(),
            )
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_values(
                option_env!("SUPABASE_URL").map(str::to_string),
                option_env!("SUPABASE_ANON_KEY").map(str::to_string),
                option_env!("APP_URL").map(str::to_string).or_else(web_origin),
            )
        }
    }

    /// Build from raw values; empty strings count as missing.
    pub fn from_values(
        url: Option<String>,
        anon_key: Option<String>,
        app_url: Option<String>,
    ) -> Result<Self, ApiError> {
        let url = non_empty(url).ok_or_else(|| ApiError::Config("SUPABASE_URL not set".into()))?;
        let anon_key = non_empty(anon_key)
            .ok_or_else(|| ApiError::Config("SUPABASE_ANON_KEY not set".into()))?;
        let config = Self::new(url, anon_key);
        Ok(match non_empty(app_url) {
            Some(app_url) => config.with_app_url(app_url),
            None => config,
        })
    }

    /// Where OAuth and email-confirmation links land.
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.app_url)
    }

    /// Where password-recovery links land.
    pub fn reset_password_url(&self) -> String {
        format!("{}/reset-password", self.app_url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(target_arch = "wasm32")]
fn web_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}
