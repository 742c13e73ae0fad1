//! # Provider sign-in and redirect completion
//!
//! Google sign-in uses the authorization code flow with PKCE:
//!
//! 1. [`sign_in_with_google`] stores a fresh verifier and returns the
//!    provider URL carrying its SHA-256 challenge.
//! 2. The provider sends the browser to `/auth/callback?code=...`.
//! 3. [`complete_redirect`] trades the code and stored verifier for a
//!    session.
//!
//! Email links (confirmation, recovery) arrive with tokens in the fragment
//! instead; [`complete_redirect`] adopts those directly.

use store::QueryClient;

use super::redirect::AuthRedirect;
use super::user_query_key;
use crate::client::Client;
use crate::error::ApiError;
use crate::models::{OAuthProvider, Session};

/// Where the app navigates after a completed redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectOutcome {
    pub session: Session,
    pub recovery: bool,
}

impl RedirectOutcome {
    pub fn destination(&self) -> &'static str {
        if self.recovery {
            "/reset-password"
        } else {
            "/"
        }
    }
}

/// Begin Google sign-in; navigate to the returned URL.
pub fn sign_in_with_google(client: &Client, redirect_to: &str) -> Result<String, ApiError> {
    client.sign_in_with_oauth(OAuthProvider::Google, redirect_to)
}

/// Establish the session described by a callback URL.
///
/// Tokens in the fragment are adopted, a `code` is exchanged, and a bare URL
/// falls back to whatever session already exists. No session at all is
/// [`ApiError::NotAuthenticated`].
pub async fn complete_redirect(
    client: &Client,
    queries: &QueryClient,
    redirect: &AuthRedirect,
) -> Result<RedirectOutcome, ApiError> {
    if let Some(message) = &redirect.error {
        return Err(ApiError::Unauthorized(message.clone()));
    }
    let recovery = redirect.is_recovery();

    let session = if let Some(tokens) = &redirect.tokens {
        client.set_session_from(tokens, recovery).await?
    } else if let Some(code) = &redirect.code {
        client.exchange_code_for_session(code).await?
    } else {
        client
            .get_session()
            .await?
            .ok_or(ApiError::NotAuthenticated)?
    };

    queries.invalidate(&user_query_key());
    Ok(RedirectOutcome { session, recovery })
}
