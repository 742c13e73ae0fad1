//! # User model for authenticated users
//!
//! [`UserInfo`] is the subset of the backend's identity record that the app
//! reads. The backend owns the record; the client never edits it except through
//! auth calls (password update). Unknown fields in the backend's JSON are
//! ignored, and every timestamp is optional because unconfirmed or freshly
//! created users do not carry all of them.
//!
//! [`UserInfo::display_name`] prefers a provider-supplied name from
//! `user_metadata` (Google sign-in fills `full_name`/`name`) and falls back to
//! the email address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User information as returned by the backend's auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl UserInfo {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: Some(email.into()),
            email_confirmed_at: None,
            created_at: None,
            updated_at: None,
            last_sign_in_at: None,
            user_metadata: serde_json::Value::Null,
        }
    }

    /// Get display name, falling back to email if the provider gave no name.
    pub fn display_name(&self) -> &str {
        ["full_name", "name"]
            .iter()
            .find_map(|field| self.user_metadata.get(field)?.as_str())
            .or(self.email.as_deref())
            .unwrap_or("")
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}
