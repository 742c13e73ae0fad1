//! Backend abstraction for the hosted auth and database service.
//!
//! [`Backend`] has one method per remote call the app makes. The production
//! implementation is [`crate::SupabaseBackend`]; [`crate::MemoryBackend`] keeps
//! everything in process for tests and offline demos.
//!
//! Methods that act on behalf of a user take the caller's access token. The
//! backend enforces row ownership from that token, so the `user_id` arguments
//! are filters, not authority.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    NewTaskRow, OAuthProvider, Session, SignUpOutcome, SignUpRequest, Task, TaskUpdate,
    UserAttributes, UserInfo,
};

/// Remote operations used by the session client and the request handler.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Backend: Send + Sync {
    /// Short identifier used in logs.
    fn backend_type(&self) -> &str;

    // Auth
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ApiError>;
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, ApiError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError>;
    /// URL of the provider consent page; the backend redirects to
    /// `redirect_to?code=...` when the user comes back.
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, ApiError>;
    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, ApiError>;
    async fn send_recovery_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ApiError>;
    async fn update_user(
        &self,
        access_token: &str,
        attributes: &UserAttributes,
    ) -> Result<UserInfo, ApiError>;
    async fn get_user(&self, access_token: &str) -> Result<UserInfo, ApiError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError>;

    // dashboard_tasks
    /// Rows owned by `user_id`, newest first.
    async fn select_tasks(&self, access_token: &str, user_id: Uuid)
        -> Result<Vec<Task>, ApiError>;
    async fn insert_task(&self, access_token: &str, row: &NewTaskRow) -> Result<Task, ApiError>;
    /// Update the row matching both `id` and `user_id`.
    async fn update_task(
        &self,
        access_token: &str,
        id: Uuid,
        user_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError>;
}
