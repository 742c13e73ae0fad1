//! Task rows in the `dashboard_tasks` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the backing table.
pub const TASKS_TABLE: &str = "dashboard_tasks";

/// A task as stored by the backend. `id` and `created_at` are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
}

/// Fields a caller supplies when creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskInsert {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskInsert {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: None,
        }
    }
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Apply this update to a local copy of a row.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Insert payload sent to the backend: the caller's fields plus the owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTaskRow {
    pub title: String,
    pub completed: bool,
    pub user_id: Uuid,
}

impl NewTaskRow {
    pub fn new(insert: TaskInsert, user_id: Uuid) -> Self {
        Self {
            title: insert.title.trim().to_string(),
            completed: insert.completed.unwrap_or(false),
            user_id,
        }
    }
}

/// Counts shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: Uuid::new_v4(),
            title: "Write report".into(),
            completed,
        }
    }

    #[test]
    fn test_update_serialises_only_present_fields() {
        let json = serde_json::to_value(TaskUpdate::completed(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn test_new_row_defaults_completed_to_false() {
        let owner = Uuid::new_v4();
        let row = NewTaskRow::new(TaskInsert::new("  Buy milk "), owner);
        assert_eq!(row.title, "Buy milk");
        assert!(!row.completed);
        assert_eq!(row.user_id, owner);
    }

    #[test]
    fn test_apply_update() {
        let mut t = task(false);
        TaskUpdate::completed(true).apply_to(&mut t);
        assert!(t.completed);
        assert_eq!(t.title, "Write report");

        TaskUpdate::title("Ship report").apply_to(&mut t);
        assert_eq!(t.title, "Ship report");
    }

    #[test]
    fn test_stats() {
        let stats = TaskStats::from_tasks(&[task(true), task(false), task(false)]);
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                completed: 1,
                pending: 2
            }
        );
        assert_eq!(TaskStats::from_tasks(&[]), TaskStats::default());
    }
}
