//! # Task queries and mutations
//!
//! The task list of a user is cached under `["dashboard-tasks", <user id>]`.
//! Mutations invalidate that key on success; observers of the cache revision
//! then run [`load_tasks`] again, which refetches because the entry is no
//! longer fresh.
//!
//! Every backend call is scoped by the signed-in user's id in addition to the
//! row-level security the backend applies.

use store::{QueryClient, QueryKey};
use uuid::Uuid;

use crate::client::Client;
use crate::error::ApiError;
use crate::models::{NewTaskRow, Task, TaskInsert, TaskStats, TaskUpdate};
use crate::validation::validate_title;

pub const TASKS_QUERY: &str = "dashboard-tasks";

pub fn tasks_query_key(user_id: Uuid) -> QueryKey {
    QueryKey::new([TASKS_QUERY.to_string(), user_id.to_string()])
}

async fn current_user_id(client: &Client) -> Result<Option<Uuid>, ApiError> {
    Ok(client.get_session().await?.map(|s| s.user.id))
}

async fn require_user_id(client: &Client) -> Result<Uuid, ApiError> {
    current_user_id(client)
        .await?
        .ok_or(ApiError::NotAuthenticated)
}

async fn select_for(client: &Client, user_id: Uuid) -> Result<Vec<Task>, ApiError> {
    client
        .select_tasks(user_id)
        .await
        .map_err(|e| e.context("Failed to fetch tasks"))
}

/// The signed-in user's tasks, newest first. Signed out reads as empty.
pub async fn fetch_tasks(client: &Client) -> Result<Vec<Task>, ApiError> {
    match current_user_id(client).await? {
        Some(user_id) => select_for(client, user_id).await,
        None => Ok(Vec::new()),
    }
}

/// [`fetch_tasks`] through the query cache.
pub async fn load_tasks(client: &Client, queries: &QueryClient) -> Result<Vec<Task>, ApiError> {
    let Some(user_id) = current_user_id(client).await? else {
        return Ok(Vec::new());
    };
    queries
        .fetch(&tasks_query_key(user_id), || select_for(client, user_id))
        .await
}

pub async fn create_task(
    client: &Client,
    queries: &QueryClient,
    insert: TaskInsert,
) -> Result<Task, ApiError> {
    validate_title(&insert.title)?;
    let user_id = require_user_id(client).await?;
    let row = NewTaskRow::new(insert, user_id);
    let task = client
        .insert_task(&row)
        .await
        .map_err(|e| e.context("Failed to create task"))?;
    tracing::debug!("Created task {}", task.id);
    queries.invalidate(&tasks_query_key(user_id));
    Ok(task)
}

pub async fn update_task(
    client: &Client,
    queries: &QueryClient,
    id: Uuid,
    update: &TaskUpdate,
) -> Result<Task, ApiError> {
    if let Some(title) = &update.title {
        validate_title(title)?;
    }
    let user_id = require_user_id(client).await?;
    let task = client
        .update_task(id, user_id, update)
        .await
        .map_err(|e| e.context("Failed to update task"))?;
    queries.invalidate(&tasks_query_key(user_id));
    Ok(task)
}

/// Flip the completed flag of `task`.
pub async fn toggle_task(
    client: &Client,
    queries: &QueryClient,
    task: &Task,
) -> Result<Task, ApiError> {
    update_task(client, queries, task.id, &TaskUpdate::completed(!task.completed)).await
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    TaskStats::from_tasks(tasks)
}
