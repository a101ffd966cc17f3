/// In-memory task mirror with optimistic updates
///
/// The dashboard holds a local mirror of the caller's task list and keeps
/// it current against the server:
///
/// - `refresh` is the eager fetch-all; the sequence is finite and can be
///   re-fetched at any time (it is not a live stream).
/// - `create` and `edit` are **pessimistic**: the mirror changes only once
///   the server has confirmed, and the server's canonical record (with its
///   assigned id and timestamps) replaces any client-side draft.
/// - `set_status`, `toggle_completed`, and `delete` are **optimistic**: an
///   immutable snapshot is taken, the mirror is mutated immediately, the
///   server call is issued, and on failure the snapshot is restored
///   verbatim, including each task's position in the list.
///
/// There is no automatic retry; rollback is the only compensating action.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use manana_shared::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use tracing::warn;
use uuid::Uuid;

use crate::api::{ClientError, TaskApi};

/// Copy of the mirror state taken before a speculative mutation
struct Snapshot {
    tasks: Vec<Task>,
    prior_status: HashMap<Uuid, TaskStatus>,
}

/// Local mirror of the caller's task list
pub struct TaskMirror<A: TaskApi> {
    api: A,
    tasks: Vec<Task>,

    /// Status each task had before it was last completed, so un-completing
    /// restores it. Forgotten on refresh; `todo` is the fallback.
    prior_status: HashMap<Uuid, TaskStatus>,
}

impl<A: TaskApi> TaskMirror<A> {
    /// Creates an empty mirror over the given API
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            prior_status: HashMap::new(),
        }
    }

    /// Current mirror contents, in server order (newest first)
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task in the mirror by id
    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            prior_status: self.prior_status.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.tasks = snapshot.tasks;
        self.prior_status = snapshot.prior_status;
    }

    /// Replaces the local copy of a task with the server's canonical record
    fn adopt(&mut self, canonical: Task) {
        if let Some(local) = self.tasks.iter_mut().find(|t| t.id == canonical.id) {
            *local = canonical;
        }
    }

    /// Re-fetches the full list from the server
    ///
    /// Replaces the mirror wholesale and forgets remembered prior
    /// statuses.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.tasks = self.api.fetch_tasks().await?;
        self.prior_status.clear();
        Ok(())
    }

    /// Creates a task (pessimistic)
    ///
    /// Validates the draft locally, then inserts the server's canonical
    /// record at the front of the mirror only after the server confirms.
    pub async fn create(&mut self, draft: NewTask) -> Result<Task, ClientError> {
        validate_title(&draft.title)?;
        validate_due_date(draft.due_date)?;

        let task = self.api.create_task(&draft).await?;
        self.tasks.insert(0, task.clone());

        Ok(task)
    }

    /// Edits a task (pessimistic)
    ///
    /// The mirror keeps its current copy until the server confirms, then
    /// adopts the canonical record.
    pub async fn edit(&mut self, id: Uuid, patch: TaskPatch) -> Result<Task, ClientError> {
        if let Some(ref title) = patch.title {
            validate_title(title)?;
        }
        validate_due_date(patch.due_date)?;

        let canonical = self.api.update_task(id, &patch).await?;
        self.adopt(canonical.clone());

        Ok(canonical)
    }

    /// Sets a task's status (optimistic)
    ///
    /// The mirror is mutated immediately; on server failure the
    /// pre-mutation snapshot is restored verbatim.
    pub async fn set_status(&mut self, id: Uuid, status: TaskStatus) -> Result<(), ClientError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ClientError::NotInMirror)?;
        let current = self.tasks[idx].status;

        let snapshot = self.snapshot();

        if status.is_completed() && !current.is_completed() {
            self.prior_status.insert(id, current);
        } else if !status.is_completed() {
            self.prior_status.remove(&id);
        }
        self.tasks[idx].status = status;

        let patch = TaskPatch {
            status: Some(status),
            ..Default::default()
        };

        match self.api.update_task(id, &patch).await {
            Ok(canonical) => {
                self.adopt(canonical);
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Status update failed, rolling back");
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    /// Toggles a task between completed and its prior non-completed status
    ///
    /// Completing remembers the status it left; un-completing restores it,
    /// falling back to `todo` when nothing is remembered (e.g. right after
    /// a refresh).
    pub async fn toggle_completed(&mut self, id: Uuid) -> Result<(), ClientError> {
        let current = self.get(id).ok_or(ClientError::NotInMirror)?.status;

        let target = if current.is_completed() {
            self.prior_status
                .get(&id)
                .copied()
                .unwrap_or(TaskStatus::Todo)
        } else {
            TaskStatus::Completed
        };

        self.set_status(id, target).await
    }

    /// Deletes a task (optimistic)
    ///
    /// The task is removed from the mirror immediately; on server failure
    /// the snapshot is restored, putting it back at its original position.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ClientError::NotInMirror)?;

        let snapshot = self.snapshot();
        self.tasks.remove(idx);

        match self.api.delete_task(id).await {
            Ok(_) => {
                self.prior_status.remove(&id);
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "Delete failed, rolling back");
                self.restore(snapshot);
                Err(e)
            }
        }
    }
}

/// Rejects empty-after-trim titles
fn validate_title(title: &str) -> Result<(), ClientError> {
    if title.trim().is_empty() {
        return Err(ClientError::Validation("Title is required".to_string()));
    }
    Ok(())
}

/// Rejects due dates before the start of the current day
///
/// Calendar-day granularity: a due date earlier today is fine, yesterday
/// is not. The server does not re-check this.
fn validate_due_date(due_date: Option<DateTime<Utc>>) -> Result<(), ClientError> {
    if let Some(due) = due_date {
        if due.date_naive() < Utc::now().date_naive() {
            return Err(ClientError::Validation(
                "Due date cannot be in the past".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Write spec").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("").is_err());
    }

    #[test]
    fn test_validate_due_date_day_granularity() {
        assert!(validate_due_date(None).is_ok());

        // Any moment today passes, even if already in the past
        let earlier_today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 1)
            .unwrap()
            .and_utc();
        assert!(validate_due_date(Some(earlier_today)).is_ok());

        assert!(validate_due_date(Some(Utc::now() - Duration::days(1))).is_err());
        assert!(validate_due_date(Some(Utc::now() + Duration::days(7))).is_ok());
    }
}
