//! Workspace CRUD handlers
//!
//! This module provides HTTP handlers for workspace operations.
//! Handlers follow the thin-layer pattern: they validate inputs, delegate to
//! services, and return responses. All business logic is in the service
//! layer. Handlers also own the response cache: reads populate it, every
//! mutation invalidates the views it touches.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use uuid::Uuid;

use crate::{
    cache::keys,
    error::{Error, Result},
    filters,
    middleware::{auth::AuthenticatedUser, workspace_access::WorkspaceAccess},
    models::requests::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceListQuery},
    services::workspaces,
    state::AppState,
};

// ============================================================================
// CREATE WORKSPACE
// ============================================================================

/// POST /api/v1/workspaces
///
/// Creates a new workspace with the authenticated user as owner. The
/// workspace row and the owner membership are written in one transaction.
///
/// # Request Body
/// - `name`: Workspace name (required, non-empty)
/// - `description`, `is_personal`, `team_id`, `active_approach`,
///   `default_tags`, `settings`: optional; defaults applied when omitted
///
/// # Returns
/// JSON response containing the created workspace with
/// `current_user_role = "owner"`.
///
/// # HTTP Status Codes
/// - `200 OK`: Workspace created successfully
/// - `400 BAD_REQUEST`: Validation error
/// - `401 UNAUTHORIZED`: No caller identity
/// - `500 INTERNAL_SERVER_ERROR`: Database error
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateWorkspaceRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let workspace = workspaces::create_workspace(tx.as_mut(), auth_user.id, request).await?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    state
        .cache
        .delete(&keys::workspace_list(auth_user.id))
        .await?;

    tracing::info!(
        operation = "create_workspace",
        workspace_id = %workspace.id,
        owner_id = %auth_user.id,
        "Workspace created",
    );

    Ok(Json(serde_json::json!({
        "workspace": workspace,
    })))
}

// ============================================================================
// LIST USER WORKSPACES
// ============================================================================

/// GET /api/v1/workspaces
///
/// Lists all workspaces the authenticated user is a member of, merged with
/// the user's role in each. Supports text search, default-tag filtering and
/// sorting via query parameters.
///
/// # Query Parameters
/// - `search`: case-insensitive substring over name and description
/// - `tags`: comma-separated default tags (at least one must match)
/// - `sort_by`: `name` | `created_at` | `updated_at`
/// - `sort_direction`: `asc` | `desc`
///
/// # HTTP Status Codes
/// - `200 OK`: Workspaces retrieved successfully
/// - `500 INTERNAL_SERVER_ERROR`: Database error
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<WorkspaceListQuery>,
) -> Result<Json<serde_json::Value>> {
    let cache_key = keys::workspace_list(auth_user.id);
    let all = match state.cache.get(&cache_key).await? {
        Some(cached) => serde_json::from_str(&cached)
            .map_err(|e| Error::Cache(format!("Corrupt cached workspace list: {}", e)))?,
        None => {
            let mut conn = state.pool.acquire().await.map_err(|e| {
                Error::Internal(format!("Failed to acquire database connection: {}", e))
            })?;
            let fresh = workspaces::list_user_workspaces(&mut conn, auth_user.id).await?;
            let serialized = serde_json::to_string(&fresh)
                .map_err(|e| Error::Cache(format!("Failed to serialize workspace list: {}", e)))?;
            state
                .cache
                .set_ex(
                    &cache_key,
                    serialized,
                    state.config.cache.response_cache_ttl_seconds,
                )
                .await?;
            fresh
        }
    };

    // Derived view: the cache holds the unfiltered list, filter/sort run on
    // every request so stale views cannot outlive an invalidation.
    let filtered = filters::filter_workspaces(&all, &query.to_filter());
    let sorted = filters::sort_workspaces(filtered, &query.to_sort());

    Ok(Json(serde_json::json!({
        "workspaces": sorted,
        "count": sorted.len(),
    })))
}

// ============================================================================
// GET SINGLE WORKSPACE
// ============================================================================

/// GET /api/v1/workspaces/{id}
///
/// Gets a single workspace by ID, merged with the caller's role.
/// Requires workspace membership (validated by middleware).
///
/// # HTTP Status Codes
/// - `200 OK`: Workspace retrieved successfully
/// - `403 FORBIDDEN`: User is not a member of the workspace
/// - `404 NOT_FOUND`: Workspace not found (dangling membership)
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(workspace_access): Extension<WorkspaceAccess>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let cache_key = keys::workspace_detail(workspace_id, workspace_access.user_id);
    if let Some(cached) = state.cache.get(&cache_key).await? {
        let workspace: serde_json::Value = serde_json::from_str(&cached)
            .map_err(|e| Error::Cache(format!("Corrupt cached workspace: {}", e)))?;
        return Ok(Json(serde_json::json!({ "workspace": workspace })));
    }

    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))?;

    let workspace = workspaces::get_workspace(&mut conn, workspace_id, workspace_access.role).await?;

    let serialized = serde_json::to_string(&workspace)
        .map_err(|e| Error::Cache(format!("Failed to serialize workspace: {}", e)))?;
    state
        .cache
        .set_ex(
            &cache_key,
            serialized,
            state.config.cache.response_cache_ttl_seconds,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "workspace": workspace,
    })))
}

// ============================================================================
// UPDATE WORKSPACE
// ============================================================================

/// PATCH /api/v1/workspaces/{id}
///
/// Partially updates workspace details. Only the supplied fields change; an
/// omitted field keeps its value, an explicit `null` clears a nullable one.
/// Requires the owner or admin role; a rejected call leaves the stored row
/// untouched, `updated_at` included.
///
/// # HTTP Status Codes
/// - `200 OK`: Workspace updated successfully
/// - `400 BAD_REQUEST`: Validation error
/// - `403 FORBIDDEN`: Caller is not owner or admin
/// - `404 NOT_FOUND`: Workspace not found
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(workspace_access): Extension<WorkspaceAccess>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<UpdateWorkspaceRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))?;

    let workspace = workspaces::update_workspace(
        &mut conn,
        workspace_id,
        workspace_access.role,
        request,
    )
    .await?;

    invalidate_workspace_views(&state, workspace_id).await?;

    tracing::info!(
        operation = "update_workspace",
        workspace_id = %workspace_id,
        requester_id = %workspace_access.user_id,
        "Workspace updated",
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "workspace": workspace,
    })))
}

// ============================================================================
// DELETE WORKSPACE
// ============================================================================

/// DELETE /api/v1/workspaces/{id}
///
/// Deletes a workspace together with all of its membership and task rows in
/// a single atomic operation.
///
/// Stricter than update: requires the caller to be the workspace's recorded
/// owner (`owner_id` on the row), not merely a member with an owner-level
/// role. Probing a missing workspace reports not-found, which is why this
/// route does not sit behind the membership middleware.
///
/// # HTTP Status Codes
/// - `200 OK`: Workspace deleted successfully
/// - `403 FORBIDDEN`: Caller is not the recorded owner
/// - `404 NOT_FOUND`: Workspace not found
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    workspaces::delete_workspace(tx.as_mut(), workspace_id, auth_user.id).await?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    invalidate_workspace_views(&state, workspace_id).await?;
    state
        .cache
        .delete_prefix(&keys::task_list_prefix(workspace_id))
        .await?;

    tracing::info!(
        operation = "delete_workspace",
        workspace_id = %workspace_id,
        owner_id = %auth_user.id,
        "Workspace deleted",
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Workspace deleted successfully",
    })))
}

/// Drops every cached view touching a workspace: its detail entries and all
/// per-user workspace lists (membership of the workspace is not tracked in
/// the cache, so the lists are dropped wholesale).
async fn invalidate_workspace_views(state: &AppState, workspace_id: Uuid) -> Result<()> {
    state
        .cache
        .delete_prefix(&keys::workspace_detail_prefix(workspace_id))
        .await?;
    state
        .cache
        .delete_prefix(&keys::workspace_list_prefix())
        .await?;
    Ok(())
}
