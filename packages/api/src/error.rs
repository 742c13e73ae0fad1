//! Error type shared by every backend call and mutation.

use crate::validation::ValidationError;

/// Errors surfaced to the initiating form or list.
///
/// Nothing is retried; each variant maps onto one of the user-visible
/// categories: configuration, authorization, validation, backend/query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("User must be authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Prefix a backend message, e.g. `Failed to create task: <message>`.
    pub fn context(self, action: &str) -> Self {
        match self {
            Self::Backend { status, message } => Self::Backend {
                status,
                message: format!("{action}: {message}"),
            },
            other => other,
        }
    }

    /// The message to show in an error banner: the backend's own message when
    /// there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend { message, .. } | Self::Unauthorized(message) | Self::Transport(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            Self::NotAuthenticated | Self::Validation(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::NotAuthenticated)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
