//! # Supabase backend over HTTP
//!
//! Talks to the two services of a hosted Supabase project:
//!
//! | Service | Base path | Used for |
//! |---------|-----------|----------|
//! | GoTrue | `/auth/v1` | sign-up, password/refresh/PKCE token grants, logout, recovery, user |
//! | PostgREST | `/rest/v1` | the `dashboard_tasks` table |
//!
//! Every request carries the project's anonymous key as `apikey`. Calls made on
//! behalf of a user add `Authorization: Bearer <access token>`, and the
//! database's row-level security policies scope them to that user.
//!
//! ## Errors
//!
//! GoTrue and PostgREST use different error bodies (`error_description`,
//! `msg`, `message`, `error`). [`parse_error`] accepts all of them. 401 and 403
//! become [`ApiError::Unauthorized`]; every other non-success status becomes
//! [`ApiError::Backend`] with the decoded message.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::models::{
    NewTaskRow, OAuthProvider, Session, SignUpOutcome, SignUpRequest, Task, TaskUpdate,
    UserAttributes, UserInfo, TASKS_TABLE,
};

const AUTH_PATH: &str = "auth/v1";
const REST_PATH: &str = "rest/v1";
/// PostgREST returns a bare object instead of a one-element array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct SupabaseBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

impl SupabaseBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// `{url}/auth/v1/{path}?{params}`
    fn auth_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        endpoint(&self.config.url, AUTH_PATH, path, params)
    }

    /// `{url}/rest/v1/{table}?{params}`
    fn rest_url(&self, table: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        endpoint(&self.config.url, REST_PATH, table, params)
    }

    fn request(&self, method: Method, url: Url, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.config.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn token_grant<B: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, ApiError> {
        let url = self.auth_url("token", &[("grant_type", grant_type)])?;
        let response = self.request(Method::POST, url, None).json(body).send().await?;
        let session: Session = decode(response).await?;
        Ok(session.with_expiry_from(Utc::now()))
    }
}

fn endpoint(
    base: &str,
    service: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!("{}/{service}/{path}", base.trim_end_matches('/')))
        .map_err(|e| ApiError::Config(format!("invalid SUPABASE_URL: {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Filter value for an equality match, e.g. `eq.<uuid>`.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Decode a non-success response body into an [`ApiError`].
pub(crate) fn parse_error(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = [
        parsed.error_description,
        parsed.msg,
        parsed.message,
        parsed.error,
    ]
    .into_iter()
    .flatten()
    .find(|m| !m.trim().is_empty())
    .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => ApiError::Unauthorized(message),
        _ => ApiError::backend(status, message),
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "backend request failed");
    Err(parse_error(status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// A sign-up returns a full session when email confirmation is disabled and a
/// bare user record when it is pending.
fn sign_up_outcome(value: serde_json::Value) -> Result<SignUpOutcome, ApiError> {
    if value.get("access_token").is_some() {
        let session: Session = serde_json::from_value(value)?;
        let session = session.with_expiry_from(Utc::now());
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }
    let user = match value.get("user") {
        Some(user) => serde_json::from_value(user.clone())?,
        None => serde_json::from_value(value)?,
    };
    Ok(SignUpOutcome {
        user,
        session: None,
    })
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Backend for SupabaseBackend {
    fn backend_type(&self) -> &str {
        "supabase"
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ApiError> {
        let params: Vec<(&str, &str)> = request
            .email_redirect_to
            .as_deref()
            .map(|to| vec![("redirect_to", to)])
            .unwrap_or_default();
        let url = self.auth_url("signup", &params)?;
        let response = self.request(Method::POST, url, None).json(request).send().await?;
        sign_up_outcome(decode(response).await?)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        self.token_grant("password", &PasswordGrant { email, password })
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let url = self.auth_url("logout", &[])?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, ApiError> {
        let url = self.auth_url(
            "authorize",
            &[
                ("provider", provider.as_str()),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )?;
        Ok(url.to_string())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, ApiError> {
        self.token_grant(
            "pkce",
            &PkceGrant {
                auth_code,
                code_verifier,
            },
        )
        .await
    }

    async fn send_recovery_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ApiError> {
        let params: Vec<(&str, &str)> = redirect_to
            .map(|to| vec![("redirect_to", to)])
            .unwrap_or_default();
        let url = self.auth_url("recover", &params)?;
        let response = self
            .request(Method::POST, url, None)
            .json(&RecoverRequest { email })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_user(
        &self,
        access_token: &str,
        attributes: &UserAttributes,
    ) -> Result<UserInfo, ApiError> {
        let url = self.auth_url("user", &[])?;
        let response = self
            .request(Method::PUT, url, Some(access_token))
            .json(attributes)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_user(&self, access_token: &str) -> Result<UserInfo, ApiError> {
        let url = self.auth_url("user", &[])?;
        let response = self
            .request(Method::GET, url, Some(access_token))
            .send()
            .await?;
        decode(response).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn select_tasks(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<Task>, ApiError> {
        let owner = eq(user_id);
        let url = self.rest_url(
            TASKS_TABLE,
            &[
                ("select", "*"),
                ("user_id", owner.as_str()),
                ("order", "created_at.desc"),
            ],
        )?;
        let response = self
            .request(Method::GET, url, Some(access_token))
            .send()
            .await?;
        decode(response).await
    }

    async fn insert_task(&self, access_token: &str, row: &NewTaskRow) -> Result<Task, ApiError> {
        let url = self.rest_url(TASKS_TABLE, &[("select", "*")])?;
        let response = self
            .request(Method::POST, url, Some(access_token))
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(row)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_task(
        &self,
        access_token: &str,
        id: Uuid,
        user_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<Task, ApiError> {
        let (id, owner) = (eq(id), eq(user_id));
        let url = self.rest_url(
            TASKS_TABLE,
            &[
                ("id", id.as_str()),
                ("user_id", owner.as_str()),
                ("select", "*"),
            ],
        )?;
        let response = self
            .request(Method::PATCH, url, Some(access_token))
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(update)
            .send()
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new(BackendConfig::new("https://proj.supabase.co/", "anon-key"))
    }

    #[test]
    fn test_rest_url_filters() {
        let user = Uuid::parse_str("8d0fd2b3-9ca4-4a0c-a2b1-2f0b4b5d0f6e").unwrap();
        let owner = eq(user);
        let url = backend()
            .rest_url(
                TASKS_TABLE,
                &[
                    ("select", "*"),
                    ("user_id", owner.as_str()),
                    ("order", "created_at.desc"),
                ],
            )
            .unwrap();
        assert_eq!(url.path(), "/rest/v1/dashboard_tasks");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("select".into(), "*".into()),
                ("user_id".into(), format!("eq.{user}")),
                ("order".into(), "created_at.desc".into()),
            ]
        );
    }

    #[test]
    fn test_authorize_url_carries_pkce_challenge() {
        let url = backend()
            .authorize_url(
                OAuthProvider::Google,
                "http://localhost:8080/auth/callback",
                "challenge123",
            )
            .unwrap();
        let url = Url::parse(&url).unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(pairs["provider"], "google");
        assert_eq!(pairs["redirect_to"], "http://localhost:8080/auth/callback");
        assert_eq!(pairs["code_challenge"], "challenge123");
        assert_eq!(pairs["code_challenge_method"], "s256");
    }

    #[test]
    fn test_parse_error_shapes() {
        assert_eq!(
            parse_error(
                400,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            ApiError::backend(400, "Invalid login credentials")
        );
        assert_eq!(
            parse_error(422, r#"{"code":422,"msg":"User already registered"}"#),
            ApiError::backend(422, "User already registered")
        );
        assert_eq!(
            parse_error(
                400,
                r#"{"code":"23502","message":"null value in column \"title\""}"#
            ),
            ApiError::backend(400, "null value in column \"title\"")
        );
        assert_eq!(
            parse_error(401, r#"{"message":"JWT expired"}"#),
            ApiError::Unauthorized("JWT expired".into())
        );
        assert_eq!(
            parse_error(502, "Bad Gateway"),
            ApiError::backend(502, "Bad Gateway")
        );
    }

    #[test]
    fn test_sign_up_outcome_pending_confirmation() {
        let value = serde_json::json!({
            "id": "8d0fd2b3-9ca4-4a0c-a2b1-2f0b4b5d0f6e",
            "email": "new@example.com",
            "confirmation_sent_at": "2024-05-01T10:00:00Z"
        });
        let outcome = sign_up_outcome(value).unwrap();
        assert!(outcome.needs_confirmation());
        assert_eq!(outcome.user.email.as_deref(), Some("new@example.com"));
    }

    #[test]
    fn test_sign_up_outcome_with_session() {
        let value = serde_json::json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "8d0fd2b3-9ca4-4a0c-a2b1-2f0b4b5d0f6e", "email": "new@example.com" }
        });
        let outcome = sign_up_outcome(value).unwrap();
        assert!(!outcome.needs_confirmation());
        assert!(outcome.session.unwrap().expires_at.is_some());
    }
}
