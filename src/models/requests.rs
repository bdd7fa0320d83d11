//! HTTP request and response DTOs.
//!
//! Request bodies stay thin: handlers deserialize them here, the service
//! layer receives the typed domain forms from the sibling model modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    filters::{
        AssigneeFilter, SortDirection, TaskFilter, TaskSort, TaskSortField, WorkspaceFilter,
        WorkspaceSort, WorkspaceSortField,
    },
    models::{
        tasks::{ApproachParams, TaskPriority, TaskStatus, UpdateTask},
        workspace_members::WorkspaceRole,
        workspaces::{UpdateWorkspace, WorkApproach, Workspace, WorkspaceSettings},
    },
};

/// Helper to deserialize double options (None = missing, Some(None) = null, Some(Some) = value)
fn deserialize_double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// WORKSPACES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_personal: bool,
    pub team_id: Option<Uuid>,
    pub active_approach: Option<WorkApproach>,
    pub default_tags: Option<Vec<String>>,
    pub settings: Option<WorkspaceSettings>,
}

/// Partial workspace update.
///
/// A field omitted from the payload is left unchanged; `description` and
/// other nullable fields accept an explicit `null` to clear the value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub description: Option<Option<String>>,
    pub active_approach: Option<WorkApproach>,
    pub default_tags: Option<Vec<String>>,
    pub settings: Option<WorkspaceSettings>,
}

impl UpdateWorkspaceRequest {
    pub fn into_update(self) -> UpdateWorkspace {
        UpdateWorkspace {
            name: self.name,
            description: self.description,
            active_approach: self.active_approach,
            default_tags: self.default_tags,
            settings: self.settings,
        }
    }
}

/// Workspace response shape: the stored row merged with the caller's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub team_id: Option<Uuid>,
    pub active_approach: WorkApproach,
    pub default_tags: Vec<String>,
    pub settings: WorkspaceSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_user_role: Option<WorkspaceRole>,
}

impl WorkspaceDto {
    pub fn from_workspace(workspace: Workspace, role: Option<WorkspaceRole>) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name,
            description: workspace.description,
            owner_id: workspace.owner_id,
            is_personal: workspace.is_personal,
            team_id: workspace.team_id,
            active_approach: workspace.active_approach,
            default_tags: workspace.default_tags,
            settings: workspace.settings.0,
            created_at: workspace.created_at,
            updated_at: workspace.updated_at,
            current_user_role: role,
        }
    }
}

/// Query parameters for the workspace listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceListQuery {
    pub search: Option<String>,
    /// Comma-separated default-tag filter (at least one must match).
    pub tags: Option<String>,
    pub sort_by: Option<WorkspaceSortField>,
    pub sort_direction: Option<SortDirection>,
}

impl WorkspaceListQuery {
    pub fn to_filter(&self) -> WorkspaceFilter {
        WorkspaceFilter {
            search: self.search.clone(),
            tags: self.tags.as_deref().map(split_csv),
        }
    }

    pub fn to_sort(&self) -> WorkspaceSort {
        WorkspaceSort {
            field: self.sort_by.unwrap_or_default(),
            direction: self.sort_direction.unwrap_or_default(),
        }
    }
}

// ============================================================================
// WORKSPACE MEMBERS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: WorkspaceRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: WorkspaceRole,
}

// ============================================================================
// TASKS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub workspace_id: Uuid,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_id: Option<Uuid>,
    pub pomodoro_estimated_cycles: Option<i32>,
    pub pomodoro_estimated_minutes: Option<i32>,
    pub approach_params: Option<ApproachParams>,
    pub order_in_list: Option<i32>,
}

/// Partial task update; same omitted-vs-null semantics as the workspace
/// update. Status is not accepted here, it has its own operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub assignee_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub pomodoro_estimated_cycles: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub pomodoro_estimated_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub approach_params: Option<Option<ApproachParams>>,
    pub order_in_list: Option<i32>,
}

impl UpdateTaskRequest {
    pub fn into_update(self) -> UpdateTask {
        UpdateTask {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            assignee_id: self.assignee_id,
            tags: self.tags,
            pomodoro_estimated_cycles: self.pomodoro_estimated_cycles,
            pomodoro_estimated_minutes: self.pomodoro_estimated_minutes,
            approach_params: self.approach_params,
            order_in_list: self.order_in_list,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
    pub workspace_id: Uuid,
}

/// Query parameters for the task listing.
///
/// Set-valued filters arrive as comma-separated values
/// (`?status=TODO,IN_PROGRESS&tags_include=work,urgent`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub workspace_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tags_include: Option<String>,
    pub tags_exclude: Option<String>,
    /// `me`, `unassigned`, or a user id.
    pub assignee: Option<String>,
    pub search: Option<String>,
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub sort_by: Option<TaskSortField>,
    pub sort_direction: Option<SortDirection>,
}

impl TaskListQuery {
    pub fn to_filter(&self) -> Result<TaskFilter> {
        let status = self
            .status
            .as_deref()
            .map(|s| parse_enum_list::<TaskStatus>(s, "status"))
            .transpose()?;
        let priority = self
            .priority
            .as_deref()
            .map(|s| parse_enum_list::<TaskPriority>(s, "priority"))
            .transpose()?;
        let assignee = self
            .assignee
            .as_deref()
            .map(|s| {
                s.parse::<AssigneeFilter>().map_err(|_| {
                    Error::Validation(format!(
                        "Invalid assignee filter '{}': expected 'me', 'unassigned' or a user id",
                        s
                    ))
                })
            })
            .transpose()?;

        Ok(TaskFilter {
            status,
            priority,
            tags_include: self.tags_include.as_deref().map(split_csv),
            tags_exclude: self.tags_exclude.as_deref().map(split_csv),
            assignee,
            search: self.search.clone(),
            due_after: self.due_after,
            due_before: self.due_before,
        })
    }

    pub fn to_sort(&self) -> TaskSort {
        TaskSort {
            field: self.sort_by.unwrap_or_default(),
            direction: self.sort_direction.unwrap_or_default(),
        }
    }
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_enum_list<T: std::str::FromStr>(s: &str, field: &str) -> Result<Vec<T>> {
    split_csv(s)
        .into_iter()
        .map(|part| {
            part.parse::<T>()
                .map_err(|_| Error::Validation(format!("Invalid {} value '{}'", field, part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_workspace_distinguishes_absent_from_null() {
        let absent: UpdateWorkspaceRequest = serde_json::from_str(r#"{"name":"n"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateWorkspaceRequest =
            serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateWorkspaceRequest =
            serde_json::from_str(r#"{"description":"notes"}"#).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[test]
    fn test_update_task_double_options() {
        let cleared: UpdateTaskRequest = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(cleared.due_date, Some(None));
        assert!(cleared.title.is_none());

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"assignee_id":"018f4e9e-1111-7aaa-8000-000000000000"}"#)
                .unwrap();
        assert!(matches!(set.assignee_id, Some(Some(_))));
    }

    #[test]
    fn test_task_list_query_parses_sets() {
        let query = TaskListQuery {
            status: Some("TODO, IN_PROGRESS".to_string()),
            priority: Some("HIGH".to_string()),
            tags_include: Some("work,urgent".to_string()),
            assignee: Some("unassigned".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(
            filter.status,
            Some(vec![TaskStatus::Todo, TaskStatus::InProgress])
        );
        assert_eq!(filter.priority, Some(vec![TaskPriority::High]));
        assert_eq!(
            filter.tags_include,
            Some(vec!["work".to_string(), "urgent".to_string()])
        );
        assert_eq!(filter.assignee, Some(AssigneeFilter::Unassigned));
    }

    #[test]
    fn test_task_list_query_rejects_bad_status() {
        let query = TaskListQuery {
            status: Some("TODO,BOGUS".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.to_filter(),
            Err(Error::Validation(message)) if message.contains("BOGUS")
        ));
    }

    #[test]
    fn test_default_sort_is_created_at_asc() {
        let sort = TaskListQuery::default().to_sort();
        assert_eq!(sort.field, TaskSortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Asc);
    }
}
