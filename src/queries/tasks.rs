use crate::{
    error::{Error, Result},
    models::tasks::{NewTask, Task, TaskStatus, UpdateTask},
};
use sqlx::{QueryBuilder, types::Json};
use uuid::Uuid;

use crate::DbConn;

/// Creates a new task in the database.
pub async fn create_task(conn: &mut DbConn, new_task: NewTask) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks
            (id, title, description, workspace_id, creator_id, assignee_id,
             priority, tags, due_date, pomodoro_estimated_cycles,
             pomodoro_estimated_minutes, approach_params, order_in_list)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(new_task.title)
    .bind(new_task.description)
    .bind(new_task.workspace_id)
    .bind(new_task.creator_id)
    .bind(new_task.assignee_id)
    .bind(new_task.priority)
    .bind(new_task.tags)
    .bind(new_task.due_date)
    .bind(new_task.pomodoro_estimated_cycles)
    .bind(new_task.pomodoro_estimated_minutes)
    .bind(new_task.approach_params.map(Json))
    .bind(new_task.order_in_list)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(task)
}

/// Gets a single task by its ID. The task may not exist.
pub async fn get_task_by_id_optional(conn: &mut DbConn, id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        SELECT * FROM tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(task)
}

/// Lists all tasks in a workspace in manual order.
///
/// Filtering and user-facing ordering happen in the pure filter/sort engine;
/// this query only scopes by workspace.
pub async fn list_tasks_by_workspace(conn: &mut DbConn, workspace_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT * FROM tasks
        WHERE workspace_id = $1
        ORDER BY order_in_list ASC, created_at ASC
        "#,
    )
    .bind(workspace_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(tasks)
}

/// Updates an existing task, touching only the supplied fields.
pub async fn update_task(conn: &mut DbConn, id: Uuid, update: UpdateTask) -> Result<Task> {
    let mut builder = QueryBuilder::new("UPDATE tasks SET updated_at = now()");

    if let Some(title) = update.title {
        builder.push(", title = ").push_bind(title);
    }
    if let Some(description) = update.description {
        builder.push(", description = ").push_bind(description);
    }
    if let Some(priority) = update.priority {
        builder.push(", priority = ").push_bind(priority);
    }
    if let Some(due_date) = update.due_date {
        builder.push(", due_date = ").push_bind(due_date);
    }
    if let Some(assignee_id) = update.assignee_id {
        builder.push(", assignee_id = ").push_bind(assignee_id);
    }
    if let Some(tags) = update.tags {
        builder.push(", tags = ").push_bind(tags);
    }
    if let Some(cycles) = update.pomodoro_estimated_cycles {
        builder.push(", pomodoro_estimated_cycles = ").push_bind(cycles);
    }
    if let Some(minutes) = update.pomodoro_estimated_minutes {
        builder.push(", pomodoro_estimated_minutes = ").push_bind(minutes);
    }
    if let Some(approach_params) = update.approach_params {
        builder
            .push(", approach_params = ")
            .push_bind(approach_params.map(Json));
    }
    if let Some(order_in_list) = update.order_in_list {
        builder.push(", order_in_list = ").push_bind(order_in_list);
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING *");

    let task = builder
        .build_query_as::<Task>()
        .fetch_one(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(task)
}

/// Sets a task's status.
///
/// Entering DONE stamps `completed_at`; any other status clears it.
pub async fn update_task_status(conn: &mut DbConn, id: Uuid, status: TaskStatus) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET status = $1,
            completed_at = CASE WHEN $1 = 'DONE'::task_status THEN now() ELSE NULL END,
            updated_at = now()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(task)
}

/// Increments a task's completed-pomodoro counter.
pub async fn increment_pomodoro_count(conn: &mut DbConn, id: Uuid) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET pomodoro_count = pomodoro_count + 1,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(task)
}

/// Deletes a task by its ID.
pub async fn delete_task(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query(
        r#"
        DELETE FROM tasks
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
