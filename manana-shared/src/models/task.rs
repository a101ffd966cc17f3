/// Task model and owner-scoped database operations
///
/// Tasks belong to exactly one user and every read/write here is filtered
/// by the owning user id. That filter is the only per-user access boundary
/// in the system: a task that never existed, belongs to someone else, or
/// was already deleted all look the same to the caller (`None`), so
/// nothing about other users' tasks can be probed through this module.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE INDEX tasks_user_created_idx ON tasks (user_id, created_at DESC);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task status
///
/// Tasks move freely between the three states; there are no forbidden
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Checks whether the task is done
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Sort rank: high sorts before medium sorts before low
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 0,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 2,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub user_id: Uuid,

    /// Title (non-empty after trimming)
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Tags, duplicates suppressed, first-seen order preserved
    pub tags: Vec<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated (stamped on every mutation)
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// Status defaults to `todo` and priority to `medium` when not given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    /// Title (required, non-empty after trimming)
    pub title: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Initial status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// Optional due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Tags (deduplicated before insert)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update for a task
///
/// Only fields that are present are written; `updated_at` is stamped on
/// every call regardless of which fields changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// New priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// New due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// New tag list (deduplicated before write)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
    }
}

/// Trims tags and suppresses duplicates, preserving first-seen order
///
/// Empty tags (after trimming) are dropped.
///
/// # Example
///
/// ```
/// use manana_shared::models::task::normalize_tags;
///
/// let tags = vec!["a".to_string(), "a".to_string(), "b".to_string()];
/// assert_eq!(normalize_tags(&tags), vec!["a", "b"]);
/// ```
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::new();

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !seen.iter().any(|s| s == tag) {
            seen.push(tag.to_string());
        }
    }

    seen
}

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, tags, created_at, updated_at";

impl Task {
    /// Creates a task for the given owner
    ///
    /// Tags are deduplicated here so the stored record never contains
    /// duplicates no matter what the caller sends.
    pub async fn insert(pool: &PgPool, owner_id: Uuid, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .bind(normalize_tags(&data.tags))
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks for an owner, newest first
    pub async fn find_all_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds one task by (owner, id)
    ///
    /// `None` covers never-existed, foreign-owned, and already-deleted
    /// alike.
    pub async fn find_by_owner_and_id(
        pool: &PgPool,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update to a task owned by `owner_id`
    ///
    /// Builds the UPDATE dynamically from the fields present in the patch.
    /// `updated_at` is always stamped, even for a patch that changes
    /// nothing else.
    pub async fn update_by_owner_and_id(
        pool: &PgPool,
        owner_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if patch.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(task_id).bind(owner_id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }
        if let Some(tags) = patch.tags {
            q = q.bind(normalize_tags(&tags));
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task owned by `owner_id`, returning the deleted row
    pub async fn delete_by_owner_and_id(
        pool: &PgPool,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Counts tasks for an owner
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts tasks for an owner in a given status
    pub async fn count_by_status(
        pool: &PgPool,
        owner_id: Uuid,
        status: TaskStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = $2")
                .bind(owner_id)
                .bind(status)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_status_serde_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let back: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, TaskStatus::Completed);
    }

    #[test]
    fn test_status_default_is_todo() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert!(!TaskStatus::default().is_completed());
        assert!(TaskStatus::Completed.is_completed());
    }

    #[test]
    fn test_priority_rank_order() {
        // high sorts first
        assert!(TaskPriority::High.rank() < TaskPriority::Medium.rank());
        assert!(TaskPriority::Medium.rank() < TaskPriority::Low.rank());
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_normalize_tags_suppresses_duplicates() {
        let tags = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["a", "b"]);
    }

    #[test]
    fn test_normalize_tags_preserves_first_seen_order() {
        let tags = vec![
            "work".to_string(),
            "home".to_string(),
            "work".to_string(),
            "urgent".to_string(),
            "home".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["work", "home", "urgent"]);
    }

    #[test]
    fn test_normalize_tags_trims_and_drops_empty() {
        let tags = vec![
            "  focus ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "focus".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["focus"]);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_deserialize_partial() {
        let patch: TaskPatch = serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert!(patch.title.is_none());
        assert!(patch.tags.is_none());
    }

    // Store operations are exercised against a live database in deployment;
    // the ownership filter is structural (every WHERE clause carries
    // user_id) and covered end-to-end by the API tests.
}
