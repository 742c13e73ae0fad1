use std::sync::Arc;

use api::models::NewTaskRow;
use api::tasks::{self, tasks_query_key};
use api::{ApiError, Backend, Client, MemoryBackend, Task, TaskInsert, TaskUpdate, ValidationError};
use store::{MemoryStore, QueryClient};
use uuid::Uuid;

async fn signed_in(backend: &MemoryBackend, email: &str) -> Client {
    let user = backend.add_user(email, "secret1");
    let session = backend.issue_session(user.id).unwrap();
    let client = Client::new(Arc::new(backend.clone()), Arc::new(MemoryStore::new()));
    client
        .set_session(&session.access_token, &session.refresh_token)
        .await
        .unwrap();
    client
}

fn user_id(client: &Client) -> Uuid {
    client.session().unwrap().user.id
}

#[tokio::test]
async fn create_invalidates_and_refetches_task_list() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;
    let queries = QueryClient::new();
    let key = tasks_query_key(user_id(&client));

    assert!(tasks::load_tasks(&client, &queries).await.unwrap().is_empty());
    assert_eq!(queries.fetch_count(&key), 1);
    let revision = queries.revision();

    let created = tasks::create_task(&client, &queries, TaskInsert::new("Buy milk"))
        .await
        .unwrap();
    assert!(!created.completed);
    assert_eq!(created.user_id, user_id(&client));
    assert!(queries.is_invalidated(&key));
    assert!(queries.revision() > revision);

    let listed = tasks::load_tasks(&client, &queries).await.unwrap();
    assert_eq!(queries.fetch_count(&key), 2);
    assert_eq!(listed, vec![created]);

    // Fresh again: a second load is served from the cache.
    tasks::load_tasks(&client, &queries).await.unwrap();
    assert_eq!(queries.fetch_count(&key), 2);
}

#[tokio::test]
async fn create_leaves_other_users_cache_alone() {
    let backend = MemoryBackend::new();
    let alice = signed_in(&backend, "alice@example.com").await;
    let bob = signed_in(&backend, "bob@example.com").await;
    let queries = QueryClient::new();

    tasks::load_tasks(&bob, &queries).await.unwrap();
    tasks::create_task(&alice, &queries, TaskInsert::new("Alice only"))
        .await
        .unwrap();

    assert!(!queries.is_invalidated(&tasks_query_key(user_id(&bob))));
    assert!(tasks::fetch_tasks(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn toggle_updates_only_that_row_for_that_user() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;
    let queries = QueryClient::new();

    let first = tasks::create_task(&client, &queries, TaskInsert::new("First"))
        .await
        .unwrap();
    let second = tasks::create_task(&client, &queries, TaskInsert::new("Second"))
        .await
        .unwrap();

    let toggled = tasks::toggle_task(&client, &queries, &first).await.unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.id, first.id);

    let rows = backend.all_tasks();
    let row = |id: Uuid| rows.iter().find(|t| t.id == id).unwrap().clone();
    assert!(row(first.id).completed);
    assert!(!row(second.id).completed);
    assert_eq!(row(first.id).title, "First");

    let back = tasks::toggle_task(&client, &queries, &toggled).await.unwrap();
    assert!(!back.completed);
}

#[tokio::test]
async fn toggle_cannot_reach_another_users_row() {
    let backend = MemoryBackend::new();
    let alice = signed_in(&backend, "alice@example.com").await;
    let mallory = signed_in(&backend, "mallory@example.com").await;
    let queries = QueryClient::new();

    let task = tasks::create_task(&alice, &queries, TaskInsert::new("Private"))
        .await
        .unwrap();
    let err = tasks::toggle_task(&mallory, &queries, &task).await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to update task: "));
    assert!(!backend.all_tasks()[0].completed);
}

#[tokio::test]
async fn empty_title_never_reaches_backend() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;

    let err = tasks::create_task(&client, &QueryClient::new(), TaskInsert::new("   "))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Validation(ValidationError::EmptyTitle));
    assert_eq!(backend.call_count("insert_task"), 0);
}

#[tokio::test]
async fn signed_out_reads_empty_and_cannot_write() {
    let backend = MemoryBackend::new();
    let client = Client::new(Arc::new(backend.clone()), Arc::new(MemoryStore::new()));
    let queries = QueryClient::new();

    assert!(tasks::fetch_tasks(&client).await.unwrap().is_empty());
    assert!(tasks::load_tasks(&client, &queries).await.unwrap().is_empty());
    assert_eq!(
        tasks::create_task(&client, &queries, TaskInsert::new("Nope"))
            .await
            .unwrap_err(),
        ApiError::NotAuthenticated
    );
    assert_eq!(backend.call_count("select_tasks"), 0);
}

#[tokio::test]
async fn backend_failures_are_prefixed() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;
    let queries = QueryClient::new();
    backend.fail_task_queries(Some("permission denied for table dashboard_tasks"));

    assert_eq!(
        tasks::fetch_tasks(&client).await.unwrap_err().to_string(),
        "Failed to fetch tasks: permission denied for table dashboard_tasks"
    );
    assert_eq!(
        tasks::create_task(&client, &queries, TaskInsert::new("x"))
            .await
            .unwrap_err()
            .to_string(),
        "Failed to create task: permission denied for table dashboard_tasks"
    );
    // A failed fetch leaves nothing cached.
    assert!(tasks::load_tasks(&client, &queries).await.is_err());
    assert!(queries
        .get::<Vec<Task>>(&tasks_query_key(user_id(&client)))
        .is_none());
}

#[tokio::test]
async fn list_is_newest_first() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;
    let queries = QueryClient::new();
    for title in ["one", "two", "three"] {
        tasks::create_task(&client, &queries, TaskInsert::new(title))
            .await
            .unwrap();
    }
    let titles: Vec<String> = tasks::fetch_tasks(&client)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["three", "two", "one"]);

    let stats = tasks::task_stats(&tasks::fetch_tasks(&client).await.unwrap());
    assert_eq!((stats.total, stats.pending), (3, 3));
}

#[tokio::test]
async fn title_update_is_scoped_by_owner() {
    let backend = MemoryBackend::new();
    let client = signed_in(&backend, "alice@example.com").await;
    let owner = user_id(&client);
    let session = client.session().unwrap();
    let row = NewTaskRow {
        title: "Draft".into(),
        completed: false,
        user_id: owner,
    };
    let task = backend.insert_task(&session.access_token, &row).await.unwrap();

    let queries = QueryClient::new();
    let updated = tasks::update_task(&client, &queries, task.id, &TaskUpdate::title("Final"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.user_id, owner);
}
