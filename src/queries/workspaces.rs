use crate::{
    error::{Error, Result},
    models::workspaces::{NewWorkspace, UpdateWorkspace, Workspace},
};
use sqlx::{QueryBuilder, types::Json};
use uuid::Uuid;

use crate::DbConn;

/// Creates a new workspace in the database.
pub async fn create_workspace(conn: &mut DbConn, new_workspace: NewWorkspace) -> Result<Workspace> {
    let workspace = sqlx::query_as::<_, Workspace>(
        r#"
        INSERT INTO workspaces
            (id, name, description, owner_id, is_personal, team_id,
             active_approach, default_tags, settings)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(new_workspace.name)
    .bind(new_workspace.description)
    .bind(new_workspace.owner_id)
    .bind(new_workspace.is_personal)
    .bind(new_workspace.team_id)
    .bind(new_workspace.active_approach)
    .bind(new_workspace.default_tags)
    .bind(Json(new_workspace.settings))
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspace)
}

/// Gets a single workspace by its ID. The workspace may not exist.
pub async fn get_workspace_by_id_optional(
    conn: &mut DbConn,
    id: Uuid,
) -> Result<Option<Workspace>> {
    let workspace = sqlx::query_as::<_, Workspace>(
        r#"
        SELECT * FROM workspaces
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspace)
}

/// Gets the workspaces for a set of IDs, skipping any that no longer exist.
pub async fn get_workspaces_by_ids(conn: &mut DbConn, ids: &[Uuid]) -> Result<Vec<Workspace>> {
    let workspaces = sqlx::query_as::<_, Workspace>(
        r#"
        SELECT * FROM workspaces
        WHERE id = ANY($1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(workspaces)
}

/// Updates an existing workspace, touching only the supplied fields.
///
/// `updated_at` is refreshed unconditionally, an empty update is just a
/// touch.
pub async fn update_workspace(
    conn: &mut DbConn,
    id: Uuid,
    update: UpdateWorkspace,
) -> Result<Workspace> {
    let mut builder = QueryBuilder::new("UPDATE workspaces SET updated_at = now()");

    if let Some(name) = update.name {
        builder.push(", name = ").push_bind(name);
    }
    if let Some(description) = update.description {
        builder.push(", description = ").push_bind(description);
    }
    if let Some(active_approach) = update.active_approach {
        builder.push(", active_approach = ").push_bind(active_approach);
    }
    if let Some(default_tags) = update.default_tags {
        builder.push(", default_tags = ").push_bind(default_tags);
    }
    if let Some(settings) = update.settings {
        builder.push(", settings = ").push_bind(Json(settings));
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING *");

    let workspace = builder
        .build_query_as::<Workspace>()
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(workspace)
}

/// Deletes a workspace by its ID. Membership and task rows go with it
/// (ON DELETE CASCADE), making the removal all-or-nothing.
pub async fn delete_workspace(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM workspaces
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
