//! Parsing of the URLs the backend sends users back to.
//!
//! Three shapes arrive at `/auth/callback` and `/reset-password`:
//!
//! - implicit grant: `#access_token=..&refresh_token=..&type=recovery|signup`
//! - PKCE: `?code=..`
//! - failure: `?error=..&error_description=..` (query or fragment)

use std::collections::HashMap;

use url::{form_urlencoded, Url};

use crate::client::RedirectTokens;
use crate::error::ApiError;

/// The auth-relevant parts of a callback URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthRedirect {
    pub tokens: Option<RedirectTokens>,
    pub code: Option<String>,
    /// The `type` parameter: `recovery`, `signup`, `magiclink`, ...
    pub kind: Option<String>,
    pub error: Option<String>,
}

impl AuthRedirect {
    pub fn parse(url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(url).map_err(|e| ApiError::Decode(format!("invalid URL: {e}")))?;
        Ok(Self::from_parts(url.query().unwrap_or(""), url.fragment().unwrap_or("")))
    }

    /// Build from a raw query string and fragment (with or without the
    /// leading `?`/`#`). Fragment values win over query values.
    pub fn from_parts(query: &str, fragment: &str) -> Self {
        let mut params: HashMap<String, String> = HashMap::new();
        for part in [query.trim_start_matches('?'), fragment.trim_start_matches('#')] {
            params.extend(form_urlencoded::parse(part.as_bytes()).into_owned());
        }
        let take = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

        let tokens = match (take("access_token"), take("refresh_token")) {
            (Some(access_token), Some(refresh_token)) => Some(RedirectTokens {
                access_token,
                refresh_token,
                expires_in: take("expires_in").and_then(|v| v.parse().ok()),
                expires_at: take("expires_at").and_then(|v| v.parse().ok()),
            }),
            _ => None,
        };

        Self {
            tokens,
            code: take("code"),
            kind: take("type"),
            error: take("error_description").or_else(|| take("error")),
        }
    }

    pub fn is_recovery(&self) -> bool {
        self.kind.as_deref() == Some("recovery")
    }

    /// Nothing auth-related in the URL.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.code.is_none() && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_tokens() {
        let redirect = AuthRedirect::parse(
            "http://localhost:8080/auth/callback#access_token=abc&expires_in=3600&refresh_token=def&token_type=bearer&type=recovery",
        )
        .unwrap();
        let tokens = redirect.tokens.as_ref().unwrap();
        assert_eq!(tokens.access_token, "abc");
        assert_eq!(tokens.refresh_token, "def");
        assert_eq!(tokens.expires_in, Some(3600));
        assert!(redirect.is_recovery());
    }

    #[test]
    fn test_code_query() {
        let redirect =
            AuthRedirect::parse("http://localhost:8080/auth/callback?code=xyz").unwrap();
        assert_eq!(redirect.code.as_deref(), Some("xyz"));
        assert!(redirect.tokens.is_none());
        assert!(!redirect.is_recovery());
    }

    #[test]
    fn test_error_description() {
        let redirect = AuthRedirect::from_parts(
            "",
            "#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired",
        );
        assert_eq!(
            redirect.error.as_deref(),
            Some("Email link is invalid or has expired")
        );
    }

    #[test]
    fn test_half_a_token_pair_is_ignored() {
        let redirect = AuthRedirect::from_parts("", "access_token=abc");
        assert!(redirect.tokens.is_none());
        assert!(redirect.is_empty());
    }
}
