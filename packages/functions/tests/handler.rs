use std::sync::Arc;

use api::models::{NewTaskRow, TaskInsert};
use api::{Backend, MemoryBackend};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use functions::{router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn call(state: AppState, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method("GET").uri("/");
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    let response = router(state)
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn state_for(backend: &MemoryBackend) -> AppState {
    AppState::new(Some(Arc::new(backend.clone()) as Arc<dyn Backend>))
}

#[tokio::test]
async fn test_missing_configuration_is_500() {
    let (status, body) = call(AppState::new(None), Some("Bearer anything")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Missing Supabase configuration" }));
}

#[tokio::test]
async fn test_missing_header_is_401() {
    let backend = MemoryBackend::new();
    let (status, body) = call(state_for(&backend), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, serde_json::json!({ "error": "Missing authorization header" }));
}

#[tokio::test]
async fn test_rejected_token_is_401_with_details() {
    let backend = MemoryBackend::new();
    let (status, body) = call(state_for(&backend), Some("Bearer not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["details"], "invalid JWT");
}

#[tokio::test]
async fn test_non_bearer_header_is_401() {
    let backend = MemoryBackend::new();
    let (status, body) = call(state_for(&backend), Some("Basic dXNlcjpwdw==")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_user_without_tasks_gets_empty_list() {
    let backend = MemoryBackend::new();
    let user = backend.add_user("ana@example.com", "secret1");
    let session = backend.issue_session(user.id).unwrap();

    let bearer = format!("Bearer {}", session.access_token);
    let (status, body) = call(state_for(&backend), Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["tasks"], serde_json::json!([]));
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_returns_only_callers_tasks_newest_first() {
    let backend = MemoryBackend::new();
    let ana = backend.add_user("ana@example.com", "secret1");
    let bob = backend.add_user("bob@example.com", "secret2");
    let ana_session = backend.issue_session(ana.id).unwrap();
    let bob_session = backend.issue_session(bob.id).unwrap();

    for title in ["first", "second"] {
        backend
            .insert_task(
                &ana_session.access_token,
                &NewTaskRow::new(TaskInsert::new(title), ana.id),
            )
            .await
            .unwrap();
    }
    backend
        .insert_task(
            &bob_session.access_token,
            &NewTaskRow::new(TaskInsert::new("not yours"), bob.id),
        )
        .await
        .unwrap();

    // lowercase scheme is accepted
    let bearer = format!("bearer {}", ana_session.access_token);
    let (status, body) = call(state_for(&backend), Some(&bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["second", "first"]);
    assert_eq!(body["tasks"][0]["completed"], false);
}

#[tokio::test]
async fn test_query_failure_is_500_with_details() {
    let backend = MemoryBackend::new();
    let user = backend.add_user("ana@example.com", "secret1");
    let session = backend.issue_session(user.id).unwrap();
    backend.fail_task_queries(Some("relation does not exist"));

    let bearer = format!("Bearer {}", session.access_token);
    let (status, body) = call(state_for(&backend), Some(&bearer)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to query database");
    assert_eq!(body["details"], "relation does not exist");
}

#[tokio::test]
async fn test_any_method_is_served() {
    let backend = MemoryBackend::new();
    let response = router(state_for(&backend))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
