use crate::{
    error::{Error, Result},
    models::workspace_members::{NewWorkspaceMember, WorkspaceMember, WorkspaceRole},
};
use uuid::Uuid;

use crate::DbConn;

/// Creates a new workspace member in the database.
///
/// The composite primary key on (workspace_id, user_id) guarantees at most
/// one membership per pair; a duplicate insert surfaces as a database error
/// the service layer maps to a conflict.
pub async fn create_workspace_member(
    conn: &mut DbConn,
    new_member: NewWorkspaceMember,
) -> Result<WorkspaceMember> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        INSERT INTO workspace_members (workspace_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(new_member.workspace_id)
    .bind(new_member.user_id)
    .bind(new_member.role)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Gets a single workspace member by workspace ID and user ID. The member may not exist.
pub async fn get_workspace_member_optional(
    conn: &mut DbConn,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<Option<WorkspaceMember>> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        SELECT * FROM workspace_members
        WHERE workspace_id = $1 AND user_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Lists all members in a specific workspace.
pub async fn list_workspace_members(
    conn: &mut DbConn,
    workspace_id: Uuid,
) -> Result<Vec<WorkspaceMember>> {
    let members = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        SELECT * FROM workspace_members
        WHERE workspace_id = $1
        ORDER BY joined_at ASC, user_id ASC
        "#,
    )
    .bind(workspace_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(members)
}

/// Lists all memberships of a user across workspaces.
pub async fn list_user_memberships(
    conn: &mut DbConn,
    user_id: Uuid,
) -> Result<Vec<WorkspaceMember>> {
    let memberships = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        SELECT * FROM workspace_members
        WHERE user_id = $1
        ORDER BY joined_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(memberships)
}

/// Updates an existing workspace member's role.
pub async fn update_workspace_member_role(
    conn: &mut DbConn,
    workspace_id: Uuid,
    user_id: Uuid,
    role: WorkspaceRole,
) -> Result<WorkspaceMember> {
    let member = sqlx::query_as::<_, WorkspaceMember>(
        r#"
        UPDATE workspace_members
        SET role = $1
        WHERE workspace_id = $2 AND user_id = $3
        RETURNING *
        "#,
    )
    .bind(role)
    .bind(workspace_id)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(member)
}

/// Deletes a workspace member by workspace ID and user ID.
pub async fn delete_workspace_member(
    conn: &mut DbConn,
    workspace_id: Uuid,
    user_id: Uuid,
) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM workspace_members
        WHERE workspace_id = $1 AND user_id = $2
        "#,
    )
    .bind(workspace_id)
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
