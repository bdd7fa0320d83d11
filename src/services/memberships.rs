//! Membership authorization and member management.
//!
//! `require_membership` is the single authorization gate: every workspace-
//! and task-scoped operation resolves (caller, workspace) to a membership
//! row before reading details or mutating anything. A missing row is always
//! `PermissionDenied`, never `NotFound`, so probing cannot distinguish
//! "no access" from "does not exist".

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        requests::{AddMemberRequest, UpdateMemberRoleRequest},
        workspace_members::{NewWorkspaceMember, WorkspaceMember, WorkspaceRole},
        workspaces::Workspace,
    },
    queries::{workspace_members, workspaces},
};
use uuid::Uuid;

/// Resolves the caller's membership in a workspace, or denies access.
pub async fn require_membership(
    conn: &mut DbConn,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<WorkspaceMember> {
    workspace_members::get_workspace_member_optional(conn, workspace_id, user_id)
        .await?
        .ok_or_else(|| Error::PermissionDenied("No access to this workspace".to_string()))
}

/// Lists the members of a workspace. Access is validated by the caller.
pub async fn list_members(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>> {
    workspace_members::list_workspace_members(conn, workspace_id).await
}

/// Adds a member to a workspace.
///
/// Managers and above may always add; plain members may add only when the
/// workspace allows member invites. The owner role is granted exclusively at
/// workspace creation and can never be assigned here.
pub async fn add_member(
    conn: &mut DbConn,
    workspace_id: Uuid,
    requester_role: WorkspaceRole,
    request: AddMemberRequest,
) -> Result<WorkspaceMember> {
    if request.role == WorkspaceRole::Owner {
        return Err(Error::Validation(
            "The owner role is assigned at workspace creation and cannot be granted".to_string(),
        ));
    }

    let workspace = get_workspace_or_not_found(conn, workspace_id).await?;
    let invites_open = workspace.settings.0.allow_member_invites;
    let allowed = requester_role.at_least(WorkspaceRole::Manager)
        || (requester_role.at_least(WorkspaceRole::Member) && invites_open);
    if !allowed {
        return Err(Error::PermissionDenied(
            "Insufficient role to add members to this workspace".to_string(),
        ));
    }

    if workspace_members::get_workspace_member_optional(conn, workspace_id, request.user_id)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(
            "User is already a member of this workspace".to_string(),
        ));
    }

    workspace_members::create_workspace_member(
        conn,
        NewWorkspaceMember {
            workspace_id,
            user_id: request.user_id,
            role: request.role,
        },
    )
    .await
}

/// Changes a member's role.
///
/// Requires admin privileges. The owner's row is untouchable and the owner
/// role cannot be granted.
pub async fn update_member_role(
    conn: &mut DbConn,
    workspace_id: Uuid,
    target_user_id: Uuid,
    requester_role: WorkspaceRole,
    request: UpdateMemberRoleRequest,
) -> Result<WorkspaceMember> {
    if !requester_role.at_least(WorkspaceRole::Admin) {
        return Err(Error::PermissionDenied(
            "Only admins can change member roles".to_string(),
        ));
    }
    if request.role == WorkspaceRole::Owner {
        return Err(Error::Validation(
            "The owner role cannot be granted".to_string(),
        ));
    }

    let target =
        workspace_members::get_workspace_member_optional(conn, workspace_id, target_user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Member not found in this workspace".to_string()))?;

    if target.role == WorkspaceRole::Owner {
        return Err(Error::PermissionDenied(
            "The workspace owner's role cannot be changed".to_string(),
        ));
    }

    workspace_members::update_workspace_member_role(conn, workspace_id, target_user_id, request.role)
        .await
}

/// Removes a member from a workspace.
///
/// Anyone may remove themselves (leave); removing someone else requires
/// admin privileges. The owner cannot be removed at all.
pub async fn remove_member(
    conn: &mut DbConn,
    workspace_id: Uuid,
    target_user_id: Uuid,
    requester_id: Uuid,
    requester_role: WorkspaceRole,
) -> Result<()> {
    let target =
        workspace_members::get_workspace_member_optional(conn, workspace_id, target_user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Member not found in this workspace".to_string()))?;

    if target.role == WorkspaceRole::Owner {
        return Err(Error::PermissionDenied(
            "The workspace owner cannot be removed".to_string(),
        ));
    }

    let leaving = requester_id == target_user_id;
    if !leaving && !requester_role.at_least(WorkspaceRole::Admin) {
        return Err(Error::PermissionDenied(
            "Only admins can remove other members".to_string(),
        ));
    }

    workspace_members::delete_workspace_member(conn, workspace_id, target_user_id).await?;
    Ok(())
}

async fn get_workspace_or_not_found(conn: &mut DbConn, workspace_id: Uuid) -> Result<Workspace> {
    workspaces::get_workspace_by_id_optional(conn, workspace_id)
        .await?
        .ok_or_else(|| Error::NotFound("Workspace not found".to_string()))
}
