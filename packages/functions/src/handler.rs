use std::sync::Arc;

use api::{ApiError, Backend, Task, UserInfo};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub backend: Option<Arc<dyn Backend>>,
}

impl AppState {
    pub fn new(backend: Option<Arc<dyn Backend>>) -> Self {
        Self { backend }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("Missing Supabase configuration")]
    MissingConfig,
    #[error("Missing authorization header")]
    MissingAuthorization,
    #[error("Unauthorized")]
    Unauthorized(String),
    #[error("Failed to query database")]
    Query(String),
}

impl FunctionError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingConfig | Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingAuthorization | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(details) | Self::Query(details) => Some(details),
            Self::MissingConfig | Self::MissingAuthorization => None,
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}: {}", self.details().unwrap_or_default());
        } else {
            tracing::warn!("{self}");
        }
        let body = match self.details() {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<&UserInfo> for ResponseUser {
    fn from(user: &UserInfo) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TasksResponse {
    pub user: ResponseUser,
    pub tasks: Vec<Task>,
    pub count: usize,
}

/// `/` for every method.
pub fn router(state: AppState) -> Router {
    Router::new().route("/", any(list_tasks)).with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, FunctionError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(FunctionError::MissingAuthorization)?;
    let value = value
        .to_str()
        .map_err(|_| FunctionError::Unauthorized("Authorization header is not valid text".into()))?;
    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(FunctionError::Unauthorized(
            "Authorization header must be a bearer token".into(),
        )),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TasksResponse>, FunctionError> {
    let backend = state.backend.as_ref().ok_or(FunctionError::MissingConfig)?;
    let token = bearer_token(&headers)?;

    let user = backend
        .get_user(token)
        .await
        .map_err(|e: ApiError| FunctionError::Unauthorized(e.to_string()))?;
    let tasks = backend
        .select_tasks(token, user.id)
        .await
        .map_err(|e| FunctionError::Query(e.to_string()))?;

    tracing::info!("Returning {} tasks for {}", tasks.len(), user.id);
    Ok(Json(TasksResponse {
        user: ResponseUser::from(&user),
        count: tasks.len(),
        tasks,
    }))
}
