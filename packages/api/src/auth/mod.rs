//! Authentication flows built on [`crate::Client`].

mod oauth;
mod password;
mod redirect;
mod session;

pub use oauth::{complete_redirect, sign_in_with_google, RedirectOutcome};
pub use password::{reset_password, send_recovery_email, sign_in, sign_up};
pub use redirect::AuthRedirect;
pub use session::SessionState;

use store::{QueryClient, QueryKey};

use crate::client::Client;
use crate::error::ApiError;
use crate::models::UserInfo;

/// Cache key of the current-user query.
pub const USER_QUERY: &str = "user";

pub fn user_query_key() -> QueryKey {
    QueryKey::from(USER_QUERY)
}

/// Current user through the query cache; `None` when signed out.
pub async fn fetch_user(
    client: &Client,
    queries: &QueryClient,
) -> Result<Option<UserInfo>, ApiError> {
    queries
        .fetch(&user_query_key(), || client.get_user())
        .await
}

/// Sign out and drop every cached query.
pub async fn sign_out(client: &Client, queries: &QueryClient) -> Result<(), ApiError> {
    let result = client.sign_out().await;
    queries.clear();
    result
}
