//! Sessions and the payloads of auth calls.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::UserInfo;

/// Seconds before the real expiry at which a session is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// A backend-issued credential pair plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp (seconds).
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: UserInfo,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fill `expires_at` from `expires_in` when the backend omitted it.
    pub fn with_expiry_from(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at?, 0).single()
    }

    /// Whether the access token is expired (or about to be) at `now`.
    /// Sessions without an expiry never expire locally.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now.timestamp() + EXPIRY_MARGIN_SECS >= at,
            None => false,
        }
    }
}

/// Result of a sign-up: the session is absent while email confirmation is pending.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: UserInfo,
    pub session: Option<Session>,
}

impl SignUpOutcome {
    pub fn needs_confirmation(&self) -> bool {
        self.session.is_none()
    }
}

/// External identity providers offered on the sign-in page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

/// Sign-up request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    #[serde(skip)]
    pub email_redirect_to: Option<String>,
}

/// Attributes accepted by a user update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserAttributes {
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            email: None,
            password: Some(password.into()),
        }
    }
}
