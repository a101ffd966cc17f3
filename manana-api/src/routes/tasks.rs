/// Task endpoints
///
/// Owner-scoped CRUD over the authenticated user's tasks. The JWT layer
/// has already resolved the session to an `AuthContext`; every store call
/// here carries that user id, which is the entire authorization model. A
/// task that doesn't exist and a task that belongs to someone else produce
/// the same 404.
///
/// # Endpoints
///
/// - `POST   /tasks` - create (201)
/// - `GET    /tasks` - list, newest first
/// - `PATCH  /tasks/:id` - partial update (200/404)
/// - `DELETE /tasks/:id` - delete, returns the deleted task (200/404)
///
/// Due dates are validated against the calendar day in the client before
/// submission; the server stores whatever it is given.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use manana_shared::auth::middleware::AuthContext;
use manana_shared::models::task::{NewTask, Task, TaskPatch};
use uuid::Uuid;

/// Create a task
///
/// Status defaults to `todo` and priority to `medium`; tags are stored
/// with duplicates suppressed in first-seen order.
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <jwt>
/// Content-Type: application/json
///
/// { "title": "Write spec", "priority": "high" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty title
/// - `401 Unauthorized`: missing/invalid session
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(mut req): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    req.title = title.to_string();

    let task = Task::insert(&state.db, auth.user_id, req).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::find_all_by_owner(&state.db, auth.user_id).await?;

    Ok(Json(tasks))
}

/// Partially update a task
///
/// Only the fields present in the body are written; `updated_at` is
/// stamped on every call. Status moves freely between the three values.
///
/// # Errors
///
/// - `400 Bad Request`: title present but empty after trimming
/// - `404 Not Found`: no task with this id for the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    if let Some(ref title) = patch.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("Title is required".to_string()));
        }
        patch.title = Some(title.to_string());
    }

    let task = Task::update_by_owner_and_id(&state.db, auth.user_id, id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete a task, returning the deleted record
///
/// # Errors
///
/// - `404 Not Found`: no task with this id for the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::delete_by_owner_and_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}
