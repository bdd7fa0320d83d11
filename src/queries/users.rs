use crate::{
    error::{Error, Result},
    models::users::{NewUser, User},
};
use uuid::Uuid;

use crate::DbConn;

/// Creates a user row, or refreshes identity fields if it already exists.
///
/// Identity comes from the external auth provider, so the first
/// authenticated request provisions the row (upsert keeps this idempotent
/// and never resets gamification state).
pub async fn upsert_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET email = EXCLUDED.email,
            display_name = COALESCE(EXCLUDED.display_name, users.display_name),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(new_user.id)
    .bind(new_user.email)
    .bind(new_user.display_name)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a single user by their ID. The user may not exist.
pub async fn get_user_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets a user row with a row lock, for read-modify-write inside a transaction.
pub async fn get_user_for_update(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Writes back recomputed gamification state.
pub async fn update_gamification(
    conn: &mut DbConn,
    id: Uuid,
    xp: i64,
    level: i32,
    total_tasks_completed: i32,
    total_pomodoro_completed: i32,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET xp = $1,
            level = $2,
            total_tasks_completed = $3,
            total_pomodoro_completed = $4,
            updated_at = now()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(xp)
    .bind(level)
    .bind(total_tasks_completed)
    .bind(total_pomodoro_completed)
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}
