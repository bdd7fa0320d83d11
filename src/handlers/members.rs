//! Workspace member management handlers
//!
//! Thin layer over the membership service. All routes here run behind the
//! workspace-access middleware, so a `WorkspaceAccess` extension with the
//! caller's resolved role is always present.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use uuid::Uuid;

use crate::{
    cache::keys,
    error::{Error, Result},
    middleware::workspace_access::WorkspaceAccess,
    models::requests::{AddMemberRequest, UpdateMemberRoleRequest},
    services::memberships,
    state::AppState,
};

/// GET /api/v1/workspaces/{id}/members
///
/// Lists all members of a workspace. Any member may view the list.
pub async fn list_members(
    State(state): State<AppState>,
    Extension(_workspace_access): Extension<WorkspaceAccess>, // Already validated by middleware
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = acquire_db_connection(&state, "list_members").await?;

    let members = memberships::list_members(&mut conn, workspace_id)
        .await
        .inspect_err(|e| log_handler_error("list_members", e))?;

    Ok(Json(serde_json::json!({
        "members": members,
        "count": members.len(),
    })))
}

/// POST /api/v1/workspaces/{id}/members
///
/// Adds a member with a specific role. Managers and above may always add;
/// plain members only when the workspace allows member invites. The owner
/// role can never be granted here.
///
/// # HTTP Status Codes
/// - `200 OK`: Member added successfully
/// - `400 BAD_REQUEST`: Owner role requested
/// - `403 FORBIDDEN`: Insufficient role
/// - `409 CONFLICT`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(workspace_access): Extension<WorkspaceAccess>,
    Path(workspace_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "add_member",
        workspace_id = %workspace_id,
        requester_id = %workspace_access.user_id,
        target_user_id = %request.user_id,
        role = %request.role,
        "Adding member to workspace",
    );

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    let member = memberships::add_member(tx.as_mut(), workspace_id, workspace_access.role, request)
        .await
        .inspect_err(|e| log_handler_error("add_member", e))?;

    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    // The new member's workspace list is stale now.
    state
        .cache
        .delete(&keys::workspace_list(member.user_id))
        .await?;

    Ok(Json(serde_json::json!({
        "member": member,
    })))
}

/// PATCH /api/v1/workspaces/{id}/members/{user_id}
///
/// Changes a member's role. Requires admin privileges; the owner's row
/// cannot be modified and the owner role cannot be granted.
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(workspace_access): Extension<WorkspaceAccess>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "update_member_role",
        workspace_id = %workspace_id,
        requester_id = %workspace_access.user_id,
        target_user_id = %target_user_id,
        new_role = %request.role,
        "Updating member role",
    );

    let mut conn = acquire_db_connection(&state, "update_member_role").await?;

    let member = memberships::update_member_role(
        &mut conn,
        workspace_id,
        target_user_id,
        workspace_access.role,
        request,
    )
    .await
    .inspect_err(|e| log_handler_error("update_member_role", e))?;

    state
        .cache
        .delete(&keys::workspace_list(target_user_id))
        .await?;
    state
        .cache
        .delete(&keys::workspace_detail(workspace_id, target_user_id))
        .await?;

    Ok(Json(serde_json::json!({
        "member": member,
    })))
}

/// DELETE /api/v1/workspaces/{id}/members/{user_id}
///
/// Removes a member. Anyone may remove themselves (leave); removing someone
/// else requires admin privileges. The owner cannot be removed.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(workspace_access): Extension<WorkspaceAccess>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!(
        operation = "remove_member",
        workspace_id = %workspace_id,
        requester_id = %workspace_access.user_id,
        target_user_id = %target_user_id,
        "Removing member from workspace",
    );

    let mut conn = acquire_db_connection(&state, "remove_member").await?;

    memberships::remove_member(
        &mut conn,
        workspace_id,
        target_user_id,
        workspace_access.user_id,
        workspace_access.role,
    )
    .await
    .inspect_err(|e| log_handler_error("remove_member", e))?;

    state
        .cache
        .delete(&keys::workspace_list(target_user_id))
        .await?;
    state
        .cache
        .delete(&keys::workspace_detail(workspace_id, target_user_id))
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Member removed successfully",
    })))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Helper to log handler errors with appropriate level
fn log_handler_error(operation: &str, e: &Error) {
    if e.is_classified() {
        tracing::warn!(operation = operation, error = %e, "Handler operation failed");
    } else {
        tracing::error!(operation = operation, error = %e, "Handler operation failed");
    }
}

/// Helper to acquire database connection with consistent error logging
async fn acquire_db_connection(
    state: &AppState,
    operation: &'static str,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
    state.pool.acquire().await.map_err(|e| {
        tracing::error!(
            operation = operation,
            error = %e,
            "Failed to acquire database connection",
        );
        Error::Internal(format!("Failed to acquire database connection: {}", e))
    })
}
