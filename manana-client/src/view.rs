/// Derived views over the task mirror
///
/// Filtering, sorting, and the dashboard summary are pure functions over
/// the current mirror contents. They are recomputed on every call and
/// never persisted.

use manana_shared::models::task::{Task, TaskPriority, TaskStatus};

/// Filter criteria for the visible task list
///
/// `None` means "don't filter on this axis". The search string matches
/// case-insensitively against title, description, and tags.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Free-text search over title/description/tags
    pub search: Option<String>,

    /// Only tasks in this status
    pub status: Option<TaskStatus>,

    /// Only tasks with this priority
    pub priority: Option<TaskPriority>,
}

fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Filters and sorts tasks for display
///
/// Sort order: priority rank ascending (high before medium before low),
/// ties broken by creation time descending.
pub fn visible_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let needle = filter.search.as_deref().map(str::to_lowercase);

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            filter.status.map_or(true, |s| task.status == s)
                && filter.priority.map_or(true, |p| task.priority == p)
                && needle
                    .as_deref()
                    .map_or(true, |n| matches_search(task, n))
        })
        .collect();

    visible.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    visible
}

/// Per-status counts and completion rate for the dashboard header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total: usize,

    /// Completed share of all tasks, rounded to whole percent; 0 when the
    /// list is empty
    pub completion_rate: u8,
}

/// Computes status counts over the mirror
pub fn summarize(tasks: &[Task]) -> StatusSummary {
    let todo = tasks.iter().filter(|t| t.status == TaskStatus::Todo).count();
    let in_progress = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count();
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let total = tasks.len();

    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };

    StatusSummary {
        todo,
        in_progress,
        completed,
        total,
        completion_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn task(title: &str, status: TaskStatus, priority: TaskPriority, age_secs: i64) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            priority,
            due_date: None,
            tags: Vec::new(),
            created_at: now - Duration::seconds(age_secs),
            updated_at: now,
        }
    }

    #[test]
    fn test_sort_priority_then_recency() {
        let tasks = vec![
            task("old low", TaskStatus::Todo, TaskPriority::Low, 300),
            task("old high", TaskStatus::Todo, TaskPriority::High, 200),
            task("new high", TaskStatus::Todo, TaskPriority::High, 100),
            task("medium", TaskStatus::Todo, TaskPriority::Medium, 50),
        ];

        let visible = visible_tasks(&tasks, &TaskFilter::default());
        let titles: Vec<&str> = visible.iter().map(|t| t.title.as_str()).collect();

        assert_eq!(titles, vec!["new high", "old high", "medium", "old low"]);
    }

    #[test]
    fn test_filter_by_status_and_priority() {
        let tasks = vec![
            task("a", TaskStatus::Todo, TaskPriority::High, 0),
            task("b", TaskStatus::Completed, TaskPriority::High, 0),
            task("c", TaskStatus::Todo, TaskPriority::Low, 0),
        ];

        let by_status = visible_tasks(
            &tasks,
            &TaskFilter {
                status: Some(TaskStatus::Todo),
                ..Default::default()
            },
        );
        assert_eq!(by_status.len(), 2);

        let by_both = visible_tasks(
            &tasks,
            &TaskFilter {
                status: Some(TaskStatus::Todo),
                priority: Some(TaskPriority::High),
                ..Default::default()
            },
        );
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].title, "a");
    }

    #[test]
    fn test_search_matches_title_description_tags() {
        let mut with_description = task("plain", TaskStatus::Todo, TaskPriority::Medium, 0);
        with_description.description = Some("Remember the milk".to_string());

        let mut with_tag = task("other", TaskStatus::Todo, TaskPriority::Medium, 0);
        with_tag.tags = vec!["groceries".to_string()];

        let tasks = vec![
            task("Buy milk", TaskStatus::Todo, TaskPriority::Medium, 0),
            with_description,
            with_tag,
            task("unrelated", TaskStatus::Todo, TaskPriority::Medium, 0),
        ];

        let hits = visible_tasks(
            &tasks,
            &TaskFilter {
                search: Some("MILK".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(hits.len(), 2);

        let tag_hits = visible_tasks(
            &tasks,
            &TaskFilter {
                search: Some("grocer".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(tag_hits.len(), 1);
        assert_eq!(tag_hits[0].title, "other");
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let tasks = vec![
            task("a", TaskStatus::Todo, TaskPriority::Medium, 0),
            task("b", TaskStatus::Completed, TaskPriority::Low, 0),
        ];

        let visible = visible_tasks(
            &tasks,
            &TaskFilter {
                search: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_summarize_counts_and_rate() {
        let tasks = vec![
            task("a", TaskStatus::Todo, TaskPriority::Medium, 0),
            task("b", TaskStatus::InProgress, TaskPriority::Medium, 0),
            task("c", TaskStatus::Completed, TaskPriority::Medium, 0),
            task("d", TaskStatus::Completed, TaskPriority::Medium, 0),
        ];

        let summary = summarize(&tasks);
        assert_eq!(summary.todo, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.completion_rate, 50);
    }

    #[test]
    fn test_summarize_empty_list() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completion_rate, 0);
    }

    #[test]
    fn test_views_do_not_mutate_the_mirror() {
        let tasks = vec![
            task("z low", TaskStatus::Todo, TaskPriority::Low, 0),
            task("a high", TaskStatus::Todo, TaskPriority::High, 0),
        ];

        let _ = visible_tasks(&tasks, &TaskFilter::default());

        // Source order untouched; the view sorted its own copy
        assert_eq!(tasks[0].title, "z low");
        assert_eq!(tasks[1].title, "a high");
    }
}
