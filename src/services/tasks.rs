use crate::DbConn;
use crate::{
    error::{Error, Result},
    filters::{self, TaskFilter, TaskSort},
    models::{
        requests::CreateTaskRequest,
        tasks::{NewTask, Task, TaskPriority, TaskStatus, UpdateTask},
        users::User,
        workspace_members::{WorkspaceMember, WorkspaceRole},
        workspaces::TaskVisibility,
    },
    queries::{tasks, workspaces},
    services::{gamification, memberships},
    validation,
};
use uuid::Uuid;

/// Creates a task in a workspace.
///
/// Editors and above may always create; plain members only when the
/// workspace settings allow it; viewers never.
pub async fn create_task(
    conn: &mut DbConn,
    caller_id: Uuid,
    request: CreateTaskRequest,
) -> Result<Task> {
    let membership = memberships::require_membership(conn, request.workspace_id, caller_id).await?;
    ensure_can_create(conn, &membership).await?;

    validation::validate_task_title(&request.title)?;
    validation::validate_description(&request.description)?;
    let tags = request.tags.unwrap_or_default();
    validation::validate_tags(&tags)?;
    validation::validate_estimate(request.pomodoro_estimated_cycles, "Pomodoro cycle estimate")?;
    validation::validate_estimate(request.pomodoro_estimated_minutes, "Pomodoro minute estimate")?;

    let new_task = NewTask {
        title: validation::sanitize_string(&request.title),
        description: request.description,
        workspace_id: request.workspace_id,
        creator_id: caller_id,
        assignee_id: request.assignee_id,
        priority: request.priority.unwrap_or(TaskPriority::Medium),
        tags,
        due_date: request.due_date,
        pomodoro_estimated_cycles: request.pomodoro_estimated_cycles,
        pomodoro_estimated_minutes: request.pomodoro_estimated_minutes,
        approach_params: request.approach_params,
        order_in_list: request.order_in_list.unwrap_or(0),
    };

    tasks::create_task(conn, new_task).await
}

/// Lists the tasks of a workspace through the filter/sort engine.
///
/// When the workspace restricts visibility, members below editor only see
/// tasks they created or are assigned to.
pub async fn list_tasks(
    conn: &mut DbConn,
    caller_id: Uuid,
    workspace_id: Uuid,
    filter: &TaskFilter,
    sort: &TaskSort,
) -> Result<Vec<Task>> {
    let membership = memberships::require_membership(conn, workspace_id, caller_id).await?;

    let mut all = tasks::list_tasks_by_workspace(conn, workspace_id).await?;

    if !membership.role.at_least(WorkspaceRole::Editor) {
        if let Some(workspace) = workspaces::get_workspace_by_id_optional(conn, workspace_id).await?
        {
            if workspace.settings.0.task_visibility == TaskVisibility::AssignedOnly {
                all.retain(|task| {
                    task.creator_id == caller_id || task.assignee_id == Some(caller_id)
                });
            }
        }
    }

    let filtered = filters::filter_tasks(&all, filter, caller_id);
    Ok(filters::sort_tasks(filtered, sort))
}

/// Gets a single task, validating membership in its workspace.
pub async fn get_task(conn: &mut DbConn, caller_id: Uuid, task_id: Uuid) -> Result<Task> {
    let task = get_task_or_not_found(conn, task_id).await?;
    memberships::require_membership(conn, task.workspace_id, caller_id).await?;
    Ok(task)
}

/// Applies a partial update to a task.
pub async fn update_task(
    conn: &mut DbConn,
    caller_id: Uuid,
    task_id: Uuid,
    update: UpdateTask,
) -> Result<Task> {
    let task = get_task_or_not_found(conn, task_id).await?;
    let membership = memberships::require_membership(conn, task.workspace_id, caller_id).await?;
    ensure_can_edit(&membership, &task)?;

    if let Some(title) = &update.title {
        validation::validate_task_title(title)?;
    }
    if let Some(description) = &update.description {
        validation::validate_description(description)?;
    }
    if let Some(tags) = &update.tags {
        validation::validate_tags(tags)?;
    }
    if let Some(cycles) = update.pomodoro_estimated_cycles {
        validation::validate_estimate(cycles, "Pomodoro cycle estimate")?;
    }
    if let Some(minutes) = update.pomodoro_estimated_minutes {
        validation::validate_estimate(minutes, "Pomodoro minute estimate")?;
    }

    tasks::update_task(conn, task_id, update).await
}

/// Sets a task's status, firing the completion reward when the task enters
/// DONE.
///
/// Returns the updated task plus the updated user when XP was credited.
/// The status write and the XP write share the caller's transaction, so a
/// partial failure cannot leave a completed task without its reward.
/// Re-completing an already-DONE task does not award twice, and leaving
/// DONE never takes XP back.
pub async fn update_task_status(
    conn: &mut DbConn,
    caller_id: Uuid,
    task_id: Uuid,
    workspace_id: Uuid,
    new_status: TaskStatus,
) -> Result<(Task, Option<User>)> {
    let task = get_task_or_not_found(conn, task_id).await?;
    if task.workspace_id != workspace_id {
        return Err(Error::Validation(
            "workspace_id does not match the task's workspace".to_string(),
        ));
    }
    let membership = memberships::require_membership(conn, task.workspace_id, caller_id).await?;
    ensure_can_edit(&membership, &task)?;

    let was_done = task.status == TaskStatus::Done;
    let updated = tasks::update_task_status(conn, task_id, new_status).await?;

    let rewarded = if new_status == TaskStatus::Done && !was_done {
        gamification::award_task_completion(conn, caller_id).await?
    } else {
        None
    };

    Ok((updated, rewarded))
}

/// Records a completed pomodoro against a task and credits its reward.
pub async fn record_pomodoro(
    conn: &mut DbConn,
    caller_id: Uuid,
    task_id: Uuid,
) -> Result<(Task, Option<User>)> {
    let task = get_task_or_not_found(conn, task_id).await?;
    memberships::require_membership(conn, task.workspace_id, caller_id).await?;

    let updated = tasks::increment_pomodoro_count(conn, task_id).await?;
    let rewarded = gamification::award_pomodoro(conn, caller_id).await?;

    Ok((updated, rewarded))
}

/// Permanently deletes a task. No cascading cleanup beyond the row itself.
pub async fn delete_task(conn: &mut DbConn, caller_id: Uuid, task_id: Uuid) -> Result<()> {
    let task = get_task_or_not_found(conn, task_id).await?;
    let membership = memberships::require_membership(conn, task.workspace_id, caller_id).await?;

    let allowed = membership.role.at_least(WorkspaceRole::Editor) || task.creator_id == caller_id;
    if !allowed {
        return Err(Error::PermissionDenied(
            "Insufficient role to delete this task".to_string(),
        ));
    }

    tasks::delete_task(conn, task_id).await?;
    Ok(())
}

async fn get_task_or_not_found(conn: &mut DbConn, task_id: Uuid) -> Result<Task> {
    tasks::get_task_by_id_optional(conn, task_id)
        .await?
        .ok_or_else(|| Error::NotFound("Task not found".to_string()))
}

/// Task creation gate: editor and above always, member only when the
/// workspace allows it, viewer never.
async fn ensure_can_create(conn: &mut DbConn, membership: &WorkspaceMember) -> Result<()> {
    if membership.role.at_least(WorkspaceRole::Editor) {
        return Ok(());
    }
    if membership.role == WorkspaceRole::Viewer {
        return Err(Error::PermissionDenied(
            "Viewers cannot create tasks".to_string(),
        ));
    }

    let workspace = workspaces::get_workspace_by_id_optional(conn, membership.workspace_id)
        .await?
        .ok_or_else(|| Error::NotFound("Workspace not found".to_string()))?;
    if !workspace.settings.0.allow_members_to_create_tasks {
        return Err(Error::PermissionDenied(
            "Members cannot create tasks in this workspace".to_string(),
        ));
    }
    Ok(())
}

/// Task mutation gate: editors and above, or the task's creator/assignee.
fn ensure_can_edit(membership: &WorkspaceMember, task: &Task) -> Result<()> {
    let allowed = membership.role.at_least(WorkspaceRole::Editor)
        || task.creator_id == membership.user_id
        || task.assignee_id == Some(membership.user_id);
    if !allowed {
        return Err(Error::PermissionDenied(
            "Insufficient role to modify this task".to_string(),
        ));
    }
    Ok(())
}
