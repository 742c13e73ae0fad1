//! # Email and password flows
//!
//! Each function validates its form first and returns
//! [`ApiError::Validation`] without reaching the backend when the form is
//! invalid. Emails are trimmed before they are sent.
//!
//! | Function | Backend call | Cache effect |
//! |----------|--------------|--------------|
//! | [`sign_in`] | password grant | invalidates `["user"]` |
//! | [`sign_up`] | sign-up | none |
//! | [`send_recovery_email`] | recover | none |
//! | [`reset_password`] | user update (needs a session) | invalidates `["user"]` |

use store::QueryClient;

use super::user_query_key;
use crate::client::Client;
use crate::error::ApiError;
use crate::models::{Session, SignUpOutcome, UserAttributes, UserInfo};
use crate::validation::{RecoveryForm, ResetPasswordForm, SignInForm, SignUpForm};

pub async fn sign_in(
    client: &Client,
    queries: &QueryClient,
    form: &SignInForm,
) -> Result<Session, ApiError> {
    form.validate()?;
    let session = client
        .sign_in_with_password(form.email.trim(), &form.password)
        .await?;
    queries.invalidate(&user_query_key());
    Ok(session)
}

/// Register a new account. `email_redirect_to` is where the confirmation
/// link lands, normally [`crate::BackendConfig::callback_url`].
pub async fn sign_up(
    client: &Client,
    form: &SignUpForm,
    email_redirect_to: Option<&str>,
) -> Result<SignUpOutcome, ApiError> {
    form.validate()?;
    let outcome = client
        .sign_up(form.email.trim(), &form.password, email_redirect_to)
        .await?;
    if outcome.needs_confirmation() {
        tracing::info!("Sign-up pending email confirmation");
    }
    Ok(outcome)
}

pub async fn send_recovery_email(
    client: &Client,
    form: &RecoveryForm,
    redirect_to: Option<&str>,
) -> Result<(), ApiError> {
    form.validate()?;
    client
        .reset_password_for_email(form.email.trim(), redirect_to)
        .await
}

/// Set a new password for the signed-in (usually recovering) user.
pub async fn reset_password(
    client: &Client,
    queries: &QueryClient,
    form: &ResetPasswordForm,
) -> Result<UserInfo, ApiError> {
    form.validate()?;
    if client.get_session().await?.is_none() {
        return Err(ApiError::NotAuthenticated);
    }
    let user = client
        .update_user(&UserAttributes::password(form.password.clone()))
        .await?;
    queries.invalidate(&user_query_key());
    Ok(user)
}
