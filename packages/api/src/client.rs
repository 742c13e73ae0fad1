//! # Session client
//!
//! [`Client`] is the one object the UI and the mutations talk to. It wraps a
//! [`Backend`], keeps the current [`Session`] in memory, persists it in a
//! [`KeyValueStore`] so a reload restores it, and broadcasts an [`AuthEvent`]
//! whenever the session changes.
//!
//! ## Persistence
//!
//! | Key | Value |
//! |-----|-------|
//! | [`SESSION_KEY`] | the JSON-encoded [`Session`] |
//! | [`CODE_VERIFIER_KEY`] | the PKCE verifier of an OAuth sign-in in progress |
//!
//! ## Expiry
//!
//! [`Client::get_session`] refreshes an expired session before returning it,
//! so every token-bearing call goes through it. A refresh that fails clears
//! the session and emits [`AuthEvent::SignedOut`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use oauth2::PkceCodeChallenge;
use store::kv::{get_json, set_json};
use store::KeyValueStore;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::models::{
    NewTaskRow, OAuthProvider, Session, SignUpOutcome, SignUpRequest, Task, TaskUpdate,
    UserAttributes, UserInfo,
};
use crate::supabase::SupabaseBackend;

pub const SESSION_KEY: &str = "sb-auth-token";
pub const CODE_VERIFIER_KEY: &str = "sb-code-verifier";

const EVENT_CAPACITY: usize = 16;

/// Session changes, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// Emitted once by [`Client::initialize`].
    InitialSession(Option<Session>),
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(UserInfo),
    /// A session established from a password-recovery link.
    PasswordRecovery(Session),
}

impl AuthEvent {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::InitialSession(session) => session.as_ref(),
            Self::SignedIn(session)
            | Self::TokenRefreshed(session)
            | Self::PasswordRecovery(session) => Some(session),
            Self::SignedOut | Self::UserUpdated(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialSession(_) => "INITIAL_SESSION",
            Self::SignedIn(_) => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed(_) => "TOKEN_REFRESHED",
            Self::UserUpdated(_) => "USER_UPDATED",
            Self::PasswordRecovery(_) => "PASSWORD_RECOVERY",
        }
    }
}

/// Tokens carried back in an auth redirect's fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
}

/// Shared auth and data client. Clones share the session and event channel.
#[derive(Clone)]
pub struct Client {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn KeyValueStore>,
    session: Arc<Mutex<Option<Session>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Client {
    pub fn new(backend: Arc<dyn Backend>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            storage,
            session: Arc::new(Mutex::new(None)),
            events,
        }
    }

    /// Client for a hosted project.
    pub fn from_config(config: BackendConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(Arc::new(SupabaseBackend::new(config)), storage)
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn current(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The in-memory session, without any expiry check.
    pub fn session(&self) -> Option<Session> {
        self.current().clone()
    }

    fn emit(&self, event: AuthEvent) {
        tracing::debug!("Auth event {}", event.name());
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    fn store_session(&self, session: Option<Session>) {
        match &session {
            Some(s) => set_json(self.storage.as_ref(), SESSION_KEY, s),
            None => self.storage.remove(SESSION_KEY),
        }
        *self.current() = session;
    }

    fn sign_in_with(&self, session: Session, event: fn(Session) -> AuthEvent) -> Session {
        self.store_session(Some(session.clone()));
        self.emit(event(session.clone()));
        session
    }

    /// Restore the persisted session, refreshing it when expired.
    pub async fn initialize(&self) -> Option<Session> {
        let stored: Option<Session> = get_json(self.storage.as_ref(), SESSION_KEY);
        let session = match stored {
            Some(s) if s.is_expired(Utc::now()) => {
                match self.backend.refresh_session(&s.refresh_token).await {
                    Ok(fresh) => Some(fresh),
                    Err(e) => {
                        tracing::warn!("Dropping stored session, refresh failed: {e}");
                        None
                    }
                }
            }
            other => other,
        };
        self.store_session(session.clone());
        self.emit(AuthEvent::InitialSession(session.clone()));
        session
    }

    /// Current session, refreshed first if it has expired.
    pub async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }
        match self.backend.refresh_session(&session.refresh_token).await {
            Ok(fresh) => Ok(Some(self.sign_in_with(fresh, AuthEvent::TokenRefreshed))),
            Err(e) => {
                self.store_session(None);
                self.emit(AuthEvent::SignedOut);
                Err(e)
            }
        }
    }

    /// Access token of a valid session, or [`ApiError::NotAuthenticated`].
    pub async fn access_token(&self) -> Result<String, ApiError> {
        self.get_session()
            .await?
            .map(|s| s.access_token)
            .ok_or(ApiError::NotAuthenticated)
    }

    /// The signed-in user as the backend sees it now, or `None` without a session.
    pub async fn get_user(&self) -> Result<Option<UserInfo>, ApiError> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };
        self.backend.get_user(&session.access_token).await.map(Some)
    }

    /// Adopt an externally issued token pair, e.g. from an email link.
    pub async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Session, ApiError> {
        let tokens = RedirectTokens {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in: None,
            expires_at: None,
        };
        self.set_session_from(&tokens, false).await
    }

    /// Like [`Client::set_session`]; `recovery` selects the event emitted.
    pub async fn set_session_from(
        &self,
        tokens: &RedirectTokens,
        recovery: bool,
    ) -> Result<Session, ApiError> {
        let session = match self.backend.get_user(&tokens.access_token).await {
            Ok(user) => Session {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                token_type: "bearer".into(),
                expires_in: tokens.expires_in.unwrap_or_default(),
                expires_at: tokens.expires_at,
                user,
            }
            .with_expiry_from(Utc::now()),
            Err(e) if e.is_unauthorized() => {
                tracing::debug!("Access token rejected, refreshing");
                self.backend.refresh_session(&tokens.refresh_token).await?
            }
            Err(e) => return Err(e),
        };
        let event: fn(Session) -> AuthEvent = if recovery {
            AuthEvent::PasswordRecovery
        } else {
            AuthEvent::SignedIn
        };
        Ok(self.sign_in_with(session, event))
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        email_redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, ApiError> {
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: serde_json::Value::Null,
            email_redirect_to: email_redirect_to.map(str::to_string),
        };
        let outcome = self.backend.sign_up(&request).await?;
        if let Some(session) = &outcome.session {
            self.sign_in_with(session.clone(), AuthEvent::SignedIn);
        }
        Ok(outcome)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        tracing::info!("Signed in as {}", session.user.id);
        Ok(self.sign_in_with(session, AuthEvent::SignedIn))
    }

    /// End the session. The local session is cleared even if the backend
    /// call fails; a rejected token counts as already signed out.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let previous = self.current().take();
        let result = match &previous {
            Some(session) => match self.backend.sign_out(&session.access_token).await {
                Err(e) if e.is_unauthorized() => Ok(()),
                other => other,
            },
            None => Ok(()),
        };
        self.store_session(None);
        self.storage.remove(CODE_VERIFIER_KEY);
        self.emit(AuthEvent::SignedOut);
        if let Err(e) = &result {
            tracing::warn!("Sign-out request failed: {e}");
        }
        result
    }

    /// Start a provider sign-in. Returns the URL to navigate to; the PKCE
    /// verifier stays in storage until the code comes back.
    pub fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, ApiError> {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        self.storage.set(CODE_VERIFIER_KEY, verifier.secret());
        self.backend
            .authorize_url(provider, redirect_to, challenge.as_str())
    }

    pub async fn exchange_code_for_session(&self, auth_code: &str) -> Result<Session, ApiError> {
        let verifier = self
            .storage
            .get(CODE_VERIFIER_KEY)
            .ok_or_else(|| ApiError::backend(400, "Code verifier not found in storage"))?;
        self.storage.remove(CODE_VERIFIER_KEY);
        let session = self
            .backend
            .exchange_code_for_session(auth_code, &verifier)
            .await?;
        Ok(self.sign_in_with(session, AuthEvent::SignedIn))
    }

    pub async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ApiError> {
        self.backend.send_recovery_email(email, redirect_to).await
    }

    pub async fn update_user(&self, attributes: &UserAttributes) -> Result<UserInfo, ApiError> {
        let token = self.access_token().await?;
        let user = self.backend.update_user(&token, attributes).await?;
        let updated = self.current().clone().map(|mut s| {
            s.user = user.clone();
            s
        });
        self.store_session(updated);
        self.emit(AuthEvent::UserUpdated(user.clone()));
        Ok(user)
    }

    pub async fn select_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, ApiError> {
        let token = self.access_token().await?;
        self.backend.select_tasks(&token, user_id).await
    }

    pub async fn insert_task(&self, row: &NewTaskRow) -> Result<Task, ApiError> {
        let token = self.access_token().await?;
        self.backend.insert_task(&token, row).await
    }

    pub async fn update_task(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError> {
        let token = self.access_token().await?;
        self.backend.update_task(&token, id, user_id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use store::MemoryStore;

    fn client() -> (Client, MemoryBackend, MemoryStore) {
        let backend = MemoryBackend::new();
        let storage = MemoryStore::new();
        let client = Client::new(Arc::new(backend.clone()), Arc::new(storage.clone()));
        (client, backend, storage)
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_broadcasts() {
        let (client, backend, storage) = client();
        backend.add_user("a@example.com", "secret1");
        let mut events = client.subscribe();

        let session = client
            .sign_in_with_password("a@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(client.session(), Some(session.clone()));
        let stored: Option<Session> = get_json(&storage, SESSION_KEY);
        assert_eq!(stored, Some(session.clone()));
        assert_eq!(events.recv().await.unwrap(), AuthEvent::SignedIn(session));
    }

    #[tokio::test]
    async fn test_initialize_restores_and_refreshes() {
        let (client, backend, storage) = client();
        let user = backend.add_user("a@example.com", "secret1");
        let mut session = backend.issue_session(user.id).unwrap();
        session.expires_at = Some(Utc::now().timestamp() - 60);
        set_json(&storage, SESSION_KEY, &session);

        let restored = client.initialize().await.unwrap();
        assert_ne!(restored.access_token, session.access_token);
        assert!(!restored.is_expired(Utc::now()));
        assert_eq!(backend.call_count("refresh_session"), 1);
    }

    #[tokio::test]
    async fn test_initialize_drops_unrefreshable_session() {
        let (client, backend, storage) = client();
        let user = backend.add_user("a@example.com", "secret1");
        let mut session = backend.issue_session(user.id).unwrap();
        session.expires_at = Some(Utc::now().timestamp() - 60);
        session.refresh_token = "revoked".into();
        set_json(&storage, SESSION_KEY, &session);
        let mut events = client.subscribe();

        assert!(client.initialize().await.is_none());
        assert!(storage.get(SESSION_KEY).is_none());
        assert_eq!(events.recv().await.unwrap(), AuthEvent::InitialSession(None));
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_backend_rejects() {
        let (client, backend, storage) = client();
        backend.add_user("a@example.com", "secret1");
        client
            .sign_in_with_password("a@example.com", "secret1")
            .await
            .unwrap();
        backend.expire_access_tokens();

        assert!(client.sign_out().await.is_ok());
        assert!(client.session().is_none());
        assert!(storage.get(SESSION_KEY).is_none());
    }

    #[tokio::test]
    async fn test_set_session_refreshes_rejected_access_token() {
        let (client, backend, _) = client();
        let user = backend.add_user("a@example.com", "secret1");
        let issued = backend.issue_session(user.id).unwrap();
        backend.expire_access_tokens();

        let session = client
            .set_session(&issued.access_token, &issued.refresh_token)
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert_ne!(session.access_token, issued.access_token);
    }

    #[tokio::test]
    async fn test_oauth_round_trip_uses_stored_verifier() {
        let (client, backend, storage) = client();
        let user = backend.add_user("g@example.com", "unused1");

        let url = client
            .sign_in_with_oauth(OAuthProvider::Google, "http://localhost:8080/auth/callback")
            .unwrap();
        assert!(storage.get(CODE_VERIFIER_KEY).is_some());

        let back = backend.complete_authorization(&url, user.id).unwrap();
        let code = url::Url::parse(&back)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let session = client.exchange_code_for_session(&code).await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert!(storage.get(CODE_VERIFIER_KEY).is_none());
    }

    #[tokio::test]
    async fn test_task_calls_require_session() {
        let (client, _, _) = client();
        assert_eq!(
            client.select_tasks(Uuid::new_v4()).await.unwrap_err(),
            ApiError::NotAuthenticated
        );
    }
}
