//! Task CRUD and status-transition handlers
//!
//! Authorization for tasks happens in the service layer (the workspace id
//! comes from the request body or the task row, not the URL), so these
//! routes only sit behind the JWT middleware. Handlers own the response
//! cache: the task list populates it, every mutation drops the workspace's
//! list prefix.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use uuid::Uuid;

use crate::{
    cache::keys,
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    models::requests::{
        CreateTaskRequest, TaskListQuery, UpdateTaskRequest, UpdateTaskStatusRequest,
    },
    services::tasks,
    state::AppState,
};

/// POST /api/v1/tasks
///
/// Creates a task in a workspace. Requires membership; plain members also
/// need the workspace's `allowMembersToCreateTasks` setting.
///
/// # HTTP Status Codes
/// - `200 OK`: Task created
/// - `400 BAD_REQUEST`: Validation error
/// - `403 FORBIDDEN`: No membership or insufficient role
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Json<serde_json::Value>> {
    let workspace_id = request.workspace_id;
    let mut conn = acquire_db_connection(&state).await?;

    let task = tasks::create_task(&mut conn, auth_user.id, request).await?;

    state
        .cache
        .delete_prefix(&keys::task_list_prefix(workspace_id))
        .await?;

    tracing::info!(
        operation = "create_task",
        task_id = %task.id,
        workspace_id = %workspace_id,
        creator_id = %auth_user.id,
        "Task created",
    );

    Ok(Json(serde_json::json!({
        "task": task,
    })))
}

/// GET /api/v1/tasks
///
/// Lists the tasks of a workspace through the filter/sort engine.
///
/// # Query Parameters
/// - `workspace_id`: required
/// - `status`, `priority`: comma-separated sets
/// - `tags_include`, `tags_exclude`: comma-separated tags
/// - `assignee`: `me`, `unassigned`, or a user id
/// - `search`: case-insensitive substring over title and description
/// - `due_after`, `due_before`: inclusive RFC 3339 bounds
/// - `sort_by`, `sort_direction`
///
/// # HTTP Status Codes
/// - `200 OK`: Tasks retrieved
/// - `400 BAD_REQUEST`: Missing workspace_id or malformed filter value
/// - `403 FORBIDDEN`: No membership
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<serde_json::Value>> {
    let workspace_id = query
        .workspace_id
        .ok_or_else(|| Error::Validation("workspace_id is required".to_string()))?;
    let filter = query.to_filter()?;
    let sort = query.to_sort();

    // The view depends on the caller (assignee=me, restricted visibility),
    // so the caller id is part of the cache key.
    let spec = serde_json::to_string(&(&filter, &sort))
        .map_err(|e| Error::Cache(format!("Failed to serialize filter spec: {}", e)))?;
    let cache_key = keys::task_list(workspace_id, &format!("{}:{}", auth_user.id, spec));

    if let Some(cached) = state.cache.get(&cache_key).await? {
        let tasks: serde_json::Value = serde_json::from_str(&cached)
            .map_err(|e| Error::Cache(format!("Corrupt cached task list: {}", e)))?;
        let count = tasks.as_array().map(|a| a.len()).unwrap_or(0);
        return Ok(Json(serde_json::json!({ "tasks": tasks, "count": count })));
    }

    let mut conn = acquire_db_connection(&state).await?;
    let result = tasks::list_tasks(&mut conn, auth_user.id, workspace_id, &filter, &sort).await?;

    let serialized = serde_json::to_string(&result)
        .map_err(|e| Error::Cache(format!("Failed to serialize task list: {}", e)))?;
    state
        .cache
        .set_ex(
            &cache_key,
            serialized,
            state.config.cache.response_cache_ttl_seconds,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "tasks": result,
        "count": result.len(),
    })))
}

/// GET /api/v1/tasks/{id}
///
/// Gets a single task. Requires membership in the task's workspace.
///
/// # HTTP Status Codes
/// - `200 OK`: Task retrieved
/// - `403 FORBIDDEN`: No membership in the task's workspace
/// - `404 NOT_FOUND`: Task not found
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state).await?;
    let task = tasks::get_task(&mut conn, auth_user.id, task_id).await?;

    Ok(Json(serde_json::json!({
        "task": task,
    })))
}

/// PATCH /api/v1/tasks/{id}
///
/// Partially updates a task. Only the supplied fields change; an omitted
/// field keeps its value, an explicit `null` clears a nullable one.
/// `updated_at` is refreshed unconditionally. Status is not accepted here.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state).await?;
    let task = tasks::update_task(&mut conn, auth_user.id, task_id, request.into_update()).await?;

    state
        .cache
        .delete_prefix(&keys::task_list_prefix(task.workspace_id))
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "task": task,
    })))
}

/// PUT /api/v1/tasks/{id}/status
///
/// Sets a task's status. All transitions between TODO, IN_PROGRESS and DONE
/// are permitted. Entering DONE stamps `completed_at` and credits the
/// caller's task-completion reward in the same transaction; leaving DONE
/// clears the stamp but never reverses the reward.
///
/// # Request Body
/// - `status`: new status
/// - `workspace_id`: must match the task's workspace
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let (task, rewarded) = tasks::update_task_status(
        tx.as_mut(),
        auth_user.id,
        task_id,
        request.workspace_id,
        request.status,
    )
    .await?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    state
        .cache
        .delete_prefix(&keys::task_list_prefix(task.workspace_id))
        .await?;
    if rewarded.is_some() {
        // Level/XP changed; the cached auth user entry is stale.
        state.user_cache.delete(&keys::user(auth_user.id)).await?;
    }

    tracing::info!(
        operation = "update_task_status",
        task_id = %task_id,
        status = %task.status,
        rewarded = rewarded.is_some(),
        "Task status updated",
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "task": task,
        "user": rewarded,
    })))
}

/// POST /api/v1/tasks/{id}/pomodoro
///
/// Records a completed pomodoro against a task: increments the task's
/// counter and credits the caller's pomodoro reward in one transaction.
pub async fn record_pomodoro(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let (task, rewarded) = tasks::record_pomodoro(tx.as_mut(), auth_user.id, task_id).await?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    state
        .cache
        .delete_prefix(&keys::task_list_prefix(task.workspace_id))
        .await?;
    if rewarded.is_some() {
        state.user_cache.delete(&keys::user(auth_user.id)).await?;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "task": task,
        "user": rewarded,
    })))
}

/// DELETE /api/v1/tasks/{id}
///
/// Permanently deletes a task. Requires the editor role or task creatorship.
/// No cascading cleanup beyond the row itself.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state).await?;

    // Fetch first so the invalidation below knows the workspace.
    let task = tasks::get_task(&mut conn, auth_user.id, task_id).await?;
    tasks::delete_task(&mut conn, auth_user.id, task_id).await?;

    state
        .cache
        .delete_prefix(&keys::task_list_prefix(task.workspace_id))
        .await?;

    tracing::info!(
        operation = "delete_task",
        task_id = %task_id,
        workspace_id = %task.workspace_id,
        "Task deleted",
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}

async fn acquire_db_connection(
    state: &AppState,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))
}
