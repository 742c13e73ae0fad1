//! In-process [`Backend`] for tests and offline runs.
//!
//! Behaves like a small hosted project: password users, opaque access and
//! refresh tokens, a PKCE authorization step, and a `dashboard_tasks` table
//! with row-level security keyed on the token's user. Every trait call is
//! counted so tests can assert how often the backend was reached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use oauth2::{PkceCodeChallenge, PkceCodeVerifier};
use url::Url;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    NewTaskRow, OAuthProvider, Session, SignUpOutcome, SignUpRequest, Task, TaskUpdate,
    UserAttributes, UserInfo,
};
use crate::validation::MIN_PASSWORD_LENGTH;

const TOKEN_LIFETIME_SECS: i64 = 3600;
const AUTHORIZE_BASE: &str = "https://memory.invalid/auth/v1/authorize";

struct Account {
    info: UserInfo,
    password: String,
}

struct PendingCode {
    user_id: Uuid,
    code_challenge: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    access_tokens: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
    codes: HashMap<String, PendingCode>,
    /// `(email, redirect_to)` per recovery request.
    recoveries: Vec<(String, Option<String>)>,
    tasks: Vec<Task>,
    calls: HashMap<&'static str, usize>,
    require_confirmation: bool,
    task_failure: Option<String>,
}

impl State {
    fn record(&mut self, op: &'static str) {
        *self.calls.entry(op).or_default() += 1;
    }

    fn user_for(&self, access_token: &str) -> Result<Uuid, ApiError> {
        self.access_tokens
            .get(access_token)
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("invalid JWT".into()))
    }

    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.info.email.as_deref() == Some(email))
    }

    fn issue(&mut self, user_id: Uuid) -> Result<Session, ApiError> {
        let user = self
            .accounts
            .get(&user_id)
            .map(|a| a.info.clone())
            .ok_or_else(|| ApiError::backend(404, "User not found"))?;
        let access_token = new_token();
        let refresh_token = new_token();
        self.access_tokens.insert(access_token.clone(), user_id);
        self.refresh_tokens.insert(refresh_token.clone(), user_id);
        Ok(Session {
            access_token,
            refresh_token,
            token_type: "bearer".into(),
            expires_in: TOKEN_LIFETIME_SECS,
            expires_at: Some(Utc::now().timestamp() + TOKEN_LIFETIME_SECS),
            user,
        })
    }

    fn check_task_failure(&self) -> Result<(), ApiError> {
        match &self.task_failure {
            Some(message) => Err(ApiError::backend(500, message.clone())),
            None => Ok(()),
        }
    }

    /// Strictly increasing so newest-first ordering is total.
    fn next_created_at(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.tasks.iter().map(|t| t.created_at).max() {
            Some(last) if last >= now => last + Duration::microseconds(1),
            _ => now,
        }
    }
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Shared handle to an in-memory project. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave new sign-ups unconfirmed and without a session.
    pub fn with_email_confirmation(self) -> Self {
        self.lock().require_confirmation = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a confirmed password user.
    pub fn add_user(&self, email: &str, password: &str) -> UserInfo {
        let now = Utc::now();
        let mut info = UserInfo::new(Uuid::new_v4(), email);
        info.email_confirmed_at = Some(now);
        info.created_at = Some(now);
        info.updated_at = Some(now);
        self.lock().accounts.insert(
            info.id,
            Account {
                info: info.clone(),
                password: password.to_string(),
            },
        );
        info
    }

    pub fn confirm_email(&self, email: &str) {
        let mut state = self.lock();
        if let Some(account) = state
            .accounts
            .values_mut()
            .find(|a| a.info.email.as_deref() == Some(email))
        {
            account.info.email_confirmed_at = Some(Utc::now());
        }
    }

    /// Issue a fresh token pair for an existing user.
    pub fn issue_session(&self, user_id: Uuid) -> Result<Session, ApiError> {
        self.lock().issue(user_id)
    }

    /// Invalidate every access token while keeping refresh tokens usable.
    pub fn expire_access_tokens(&self) {
        self.lock().access_tokens.clear();
    }

    /// Play the provider's part of an authorization: accept the consent page
    /// URL for `user_id` and return where the browser would be sent back to.
    pub fn complete_authorization(
        &self,
        authorize_url: &str,
        user_id: Uuid,
    ) -> Result<String, ApiError> {
        let url = Url::parse(authorize_url).map_err(|e| ApiError::Decode(e.to_string()))?;
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let (Some(redirect_to), Some(challenge)) =
            (params.get("redirect_to"), params.get("code_challenge"))
        else {
            return Err(ApiError::backend(400, "missing redirect_to or code_challenge"));
        };
        let code = new_token();
        self.lock().codes.insert(
            code.clone(),
            PendingCode {
                user_id,
                code_challenge: challenge.clone(),
            },
        );
        let mut back = Url::parse(redirect_to).map_err(|e| ApiError::Decode(e.to_string()))?;
        back.query_pairs_mut().append_pair("code", &code);
        Ok(back.to_string())
    }

    /// The link a recovery email for `email` would contain: the redirect
    /// target with a fresh session in its fragment.
    pub fn recovery_link(&self, email: &str) -> Option<String> {
        let mut state = self.lock();
        let redirect = state
            .recoveries
            .iter()
            .rev()
            .find(|(e, _)| e == email)?
            .1
            .clone()
            .unwrap_or_else(|| "http://localhost:8080/".into());
        let user_id = state.find_by_email(email)?.info.id;
        let session = state.issue(user_id).ok()?;
        Some(format!(
            concat!(
                "{redirect}#access_token={}&refresh_token={}&expires_in={}",
                "&token_type=bearer&type=recovery"
            ),
            session.access_token,
            session.refresh_token,
            session.expires_in,
            redirect = redirect,
        ))
    }

    pub fn recovery_requests(&self) -> Vec<String> {
        self.lock().recoveries.iter().map(|(e, _)| e.clone()).collect()
    }

    /// Make every task query fail with `message` until cleared with `None`.
    pub fn fail_task_queries(&self, message: Option<&str>) {
        self.lock().task_failure = message.map(str::to_string);
    }

    /// How many times the named trait method has been called.
    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    /// Every stored row regardless of owner.
    pub fn all_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn password_of(&self, user_id: Uuid) -> Option<String> {
        self.lock().accounts.get(&user_id).map(|a| a.password.clone())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Backend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ApiError> {
        let mut state = self.lock();
        state.record("sign_up");
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::backend(
                422,
                "Password should be at least 6 characters.",
            ));
        }
        if state.find_by_email(&request.email).is_some() {
            return Err(ApiError::backend(422, "User already registered"));
        }

        let now = Utc::now();
        let mut info = UserInfo::new(Uuid::new_v4(), request.email.clone());
        info.created_at = Some(now);
        info.updated_at = Some(now);
        info.user_metadata = request.data.clone();
        if !state.require_confirmation {
            info.email_confirmed_at = Some(now);
        }
        state.accounts.insert(
            info.id,
            Account {
                info: info.clone(),
                password: request.password.clone(),
            },
        );

        let session = if state.require_confirmation {
            None
        } else {
            Some(state.issue(info.id)?)
        };
        Ok(SignUpOutcome {
            user: info,
            session,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let mut state = self.lock();
        state.record("sign_in_with_password");
        let account = state
            .find_by_email(email)
            .filter(|a| a.password == password)
            .ok_or_else(|| ApiError::backend(400, "Invalid login credentials"))?;
        if account.info.email_confirmed_at.is_none() {
            return Err(ApiError::backend(400, "Email not confirmed"));
        }
        let user_id = account.info.id;
        if let Some(account) = state.accounts.get_mut(&user_id) {
            account.info.last_sign_in_at = Some(Utc::now());
        }
        state.issue(user_id)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.record("sign_out");
        let user_id = state.user_for(access_token)?;
        state.access_tokens.retain(|_, owner| *owner != user_id);
        state.refresh_tokens.retain(|_, owner| *owner != user_id);
        Ok(())
    }

    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, ApiError> {
        self.lock().record("authorize_url");
        let mut url = Url::parse(AUTHORIZE_BASE).map_err(|e| ApiError::Config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "s256");
        Ok(url.to_string())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, ApiError> {
        let mut state = self.lock();
        state.record("exchange_code_for_session");
        let pending = state
            .codes
            .remove(auth_code)
            .ok_or_else(|| {
                ApiError::backend(404, "invalid flow state, no valid flow state found")
            })?;
        let verifier = PkceCodeVerifier::new(code_verifier.to_string());
        let expected = PkceCodeChallenge::from_code_verifier_sha256(&verifier);
        if expected.as_str() != pending.code_challenge {
            return Err(ApiError::backend(
                400,
                "code challenge does not match previously saved code verifier",
            ));
        }
        state.issue(pending.user_id)
    }

    async fn send_recovery_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.record("send_recovery_email");
        state
            .recoveries
            .push((email.to_string(), redirect_to.map(str::to_string)));
        Ok(())
    }

    async fn update_user(
        &self,
        access_token: &str,
        attributes: &UserAttributes,
    ) -> Result<UserInfo, ApiError> {
        let mut state = self.lock();
        state.record("update_user");
        let user_id = state.user_for(access_token)?;
        if let Some(password) = &attributes.password {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(ApiError::backend(
                    422,
                    "Password should be at least 6 characters.",
                ));
            }
        }
        let account = state
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| ApiError::backend(404, "User not found"))?;
        if let Some(password) = &attributes.password {
            account.password.clone_from(password);
        }
        if let Some(email) = &attributes.email {
            account.info.email = Some(email.clone());
        }
        account.info.updated_at = Some(Utc::now());
        Ok(account.info.clone())
    }

    async fn get_user(&self, access_token: &str) -> Result<UserInfo, ApiError> {
        let mut state = self.lock();
        state.record("get_user");
        let user_id = state.user_for(access_token)?;
        state
            .accounts
            .get(&user_id)
            .map(|a| a.info.clone())
            .ok_or_else(|| ApiError::backend(404, "User not found"))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let mut state = self.lock();
        state.record("refresh_session");
        let user_id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| {
                ApiError::backend(400, "Invalid Refresh Token: Refresh Token Not Found")
            })?;
        state.issue(user_id)
    }

    async fn select_tasks(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<Task>, ApiError> {
        let mut state = self.lock();
        state.record("select_tasks");
        let caller = state.user_for(access_token)?;
        state.check_task_failure()?;
        let mut rows: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == caller && t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_task(&self, access_token: &str, row: &NewTaskRow) -> Result<Task, ApiError> {
        let mut state = self.lock();
        state.record("insert_task");
        let caller = state.user_for(access_token)?;
        state.check_task_failure()?;
        if row.user_id != caller {
            return Err(ApiError::Unauthorized(
                "new row violates row-level security policy for table \"dashboard_tasks\"".into(),
            ));
        }
        let task = Task {
            id: Uuid::new_v4(),
            created_at: state.next_created_at(),
            user_id: row.user_id,
            title: row.title.clone(),
            completed: row.completed,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        access_token: &str,
        id: Uuid,
        user_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError> {
        let mut state = self.lock();
        state.record("update_task");
        let caller = state.user_for(access_token)?;
        state.check_task_failure()?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id && t.user_id == caller)
            .ok_or_else(|| {
                ApiError::backend(406, "JSON object requested, multiple (or no) rows returned")
            })?;
        update.apply_to(task);
        Ok(task.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: password.into(),
            data: serde_json::Value::Null,
            email_redirect_to: None,
        }
    }

    #[tokio::test]
    async fn test_password_sign_in() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("a@example.com", "secret1");

        let session = backend
            .sign_in_with_password("a@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(backend.get_user(&session.access_token).await.unwrap().id, user.id);

        let err = backend
            .sign_in_with_password("a@example.com", "wrong!")
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::backend(400, "Invalid login credentials"));
        assert_eq!(backend.call_count("sign_in_with_password"), 2);
    }

    #[tokio::test]
    async fn test_sign_up_with_confirmation_returns_no_session() {
        let backend = MemoryBackend::new().with_email_confirmation();
        let outcome = backend
            .sign_up(&sign_up_request("new@example.com", "secret1"))
            .await
            .unwrap();
        assert!(outcome.needs_confirmation());

        let err = backend
            .sign_in_with_password("new@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::backend(400, "Email not confirmed"));

        backend.confirm_email("new@example.com");
        assert!(backend
            .sign_in_with_password("new@example.com", "secret1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let backend = MemoryBackend::new();
        backend.add_user("a@example.com", "secret1");
        let err = backend
            .sign_up(&sign_up_request("a@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::backend(422, "User already registered"));
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_token_owner() {
        let backend = MemoryBackend::new();
        let alice = backend.add_user("alice@example.com", "secret1");
        let bob = backend.add_user("bob@example.com", "secret1");
        let alice_session = backend.issue_session(alice.id).unwrap();
        let bob_session = backend.issue_session(bob.id).unwrap();

        let row = NewTaskRow {
            title: "Alice's task".into(),
            completed: false,
            user_id: alice.id,
        };
        let task = backend
            .insert_task(&alice_session.access_token, &row)
            .await
            .unwrap();

        // Bob cannot read, update, or insert on Alice's behalf.
        assert!(backend
            .select_tasks(&bob_session.access_token, alice.id)
            .await
            .unwrap()
            .is_empty());
        assert!(backend
            .update_task(
                &bob_session.access_token,
                task.id,
                alice.id,
                &TaskUpdate::completed(true)
            )
            .await
            .is_err());
        assert!(backend
            .insert_task(&bob_session.access_token, &row)
            .await
            .unwrap_err()
            .is_unauthorized());

        assert!(!backend.all_tasks()[0].completed);
    }

    #[tokio::test]
    async fn test_select_orders_newest_first() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("a@example.com", "secret1");
        let session = backend.issue_session(user.id).unwrap();
        for title in ["first", "second", "third"] {
            let row = NewTaskRow {
                title: title.into(),
                completed: false,
                user_id: user.id,
            };
            backend.insert_task(&session.access_token, &row).await.unwrap();
        }
        let titles: Vec<String> = backend
            .select_tasks(&session.access_token, user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("a@example.com", "secret1");
        let session = backend.issue_session(user.id).unwrap();

        let refreshed = backend.refresh_session(&session.refresh_token).await.unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(backend.refresh_session(&session.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_pkce_code_exchange_checks_verifier() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("a@example.com", "secret1");
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();

        let url = backend
            .authorize_url(
                OAuthProvider::Google,
                "http://localhost:8080/auth/callback",
                challenge.as_str(),
            )
            .unwrap();
        let back = backend.complete_authorization(&url, user.id).unwrap();
        let code = Url::parse(&back)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        assert!(backend
            .exchange_code_for_session(&code, "not-the-verifier")
            .await
            .is_err());
        // A failed exchange consumes the code.
        assert!(backend
            .exchange_code_for_session(&code, verifier.secret())
            .await
            .is_err());

        let url = backend
            .authorize_url(
                OAuthProvider::Google,
                "http://localhost:8080/auth/callback",
                challenge.as_str(),
            )
            .unwrap();
        let back = backend.complete_authorization(&url, user.id).unwrap();
        let code = Url::parse(&back)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let session = backend
            .exchange_code_for_session(&code, verifier.secret())
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
    }

    #[tokio::test]
    async fn test_injected_task_failure() {
        let backend = MemoryBackend::new();
        let user = backend.add_user("a@example.com", "secret1");
        let session = backend.issue_session(user.id).unwrap();

        backend.fail_task_queries(Some("relation does not exist"));
        assert_eq!(
            backend
                .select_tasks(&session.access_token, user.id)
                .await
                .unwrap_err(),
            ApiError::backend(500, "relation does not exist")
        );

        backend.fail_task_queries(None);
        assert!(backend
            .select_tasks(&session.access_token, user.id)
            .await
            .is_ok());
    }
}
