use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::{
        requests::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceDto},
        workspace_members::{NewWorkspaceMember, WorkspaceRole},
        workspaces::NewWorkspace,
    },
    queries::{workspace_members, workspaces},
    validation,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Creates a workspace with the caller as its owner.
///
/// The workspace row and the owner membership row are written on the same
/// connection; the handler wraps this call in a transaction so the pair is
/// all-or-nothing.
pub async fn create_workspace(
    conn: &mut DbConn,
    owner_id: Uuid,
    request: CreateWorkspaceRequest,
) -> Result<WorkspaceDto> {
    validation::validate_workspace_name(&request.name)?;
    validation::validate_description(&request.description)?;
    let default_tags = request.default_tags.unwrap_or_default();
    validation::validate_tags(&default_tags)?;

    let new_workspace = NewWorkspace {
        name: validation::sanitize_string(&request.name),
        description: request.description,
        owner_id,
        is_personal: request.is_personal,
        team_id: request.team_id,
        active_approach: request.active_approach.unwrap_or_default(),
        default_tags,
        settings: request.settings.unwrap_or_default(),
    };
    let workspace = workspaces::create_workspace(conn, new_workspace).await?;

    let membership = workspace_members::create_workspace_member(
        conn,
        NewWorkspaceMember {
            workspace_id: workspace.id,
            user_id: owner_id,
            role: WorkspaceRole::Owner,
        },
    )
    .await?;

    Ok(WorkspaceDto::from_workspace(workspace, Some(membership.role)))
}

/// Lists all workspaces the user is a member of, each merged with the
/// user's role.
///
/// A membership pointing at a workspace that no longer exists is skipped
/// silently; the listing self-heals instead of failing.
pub async fn list_user_workspaces(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<WorkspaceDto>> {
    let memberships = workspace_members::list_user_memberships(conn, user_id).await?;
    if memberships.is_empty() {
        return Ok(Vec::new());
    }

    let role_by_workspace: HashMap<Uuid, WorkspaceRole> = memberships
        .iter()
        .map(|m| (m.workspace_id, m.role))
        .collect();
    let ids: Vec<Uuid> = memberships.iter().map(|m| m.workspace_id).collect();

    let found = workspaces::get_workspaces_by_ids(conn, &ids).await?;
    let dtos = found
        .into_iter()
        .map(|workspace| {
            let role = role_by_workspace.get(&workspace.id).copied();
            WorkspaceDto::from_workspace(workspace, role)
        })
        .collect();

    Ok(dtos)
}

/// Gets a workspace's details merged with the caller's role.
///
/// Membership has already been validated; a missing row at this point is a
/// dangling membership and reported as not found.
pub async fn get_workspace(
    conn: &mut DbConn,
    workspace_id: Uuid,
    role: WorkspaceRole,
) -> Result<WorkspaceDto> {
    let workspace = workspaces::get_workspace_by_id_optional(conn, workspace_id)
        .await?
        .ok_or_else(|| Error::NotFound("Workspace not found".to_string()))?;

    Ok(WorkspaceDto::from_workspace(workspace, Some(role)))
}

/// Applies a partial update to a workspace.
///
/// Requires the owner or admin role. The permission check runs before any
/// write, so a rejected call leaves the row (including `updated_at`)
/// untouched. The caller's pre-update role is reused in the response.
pub async fn update_workspace(
    conn: &mut DbConn,
    workspace_id: Uuid,
    role: WorkspaceRole,
    request: UpdateWorkspaceRequest,
) -> Result<WorkspaceDto> {
    if !role.at_least(WorkspaceRole::Admin) {
        return Err(Error::PermissionDenied(
            "Only the owner or an admin can update this workspace".to_string(),
        ));
    }

    if let Some(name) = &request.name {
        validation::validate_workspace_name(name)?;
    }
    if let Some(description) = &request.description {
        validation::validate_description(description)?;
    }
    if let Some(tags) = &request.default_tags {
        validation::validate_tags(tags)?;
    }

    // Existence check before the update so a dangling membership surfaces
    // as not-found rather than a bare database error.
    if workspaces::get_workspace_by_id_optional(conn, workspace_id)
        .await?
        .is_none()
    {
        return Err(Error::NotFound("Workspace not found".to_string()));
    }

    let workspace = workspaces::update_workspace(conn, workspace_id, request.into_update()).await?;
    Ok(WorkspaceDto::from_workspace(workspace, Some(role)))
}

/// Deletes a workspace with all of its memberships and tasks.
///
/// Stricter than update: only the literal owner recorded on the workspace
/// row may delete, regardless of membership roles. The existence check runs
/// first, so probing a missing workspace reports not-found.
pub async fn delete_workspace(conn: &mut DbConn, workspace_id: Uuid, caller_id: Uuid) -> Result<()> {
    let workspace = workspaces::get_workspace_by_id_optional(conn, workspace_id)
        .await?
        .ok_or_else(|| Error::NotFound("Workspace not found".to_string()))?;

    if workspace.owner_id != caller_id {
        return Err(Error::PermissionDenied(
            "Only the workspace owner can delete the workspace".to_string(),
        ));
    }

    let rows_affected = workspaces::delete_workspace(conn, workspace_id).await?;
    if rows_affected == 0 {
        return Err(Error::NotFound("Workspace not found".to_string()));
    }

    Ok(())
}
