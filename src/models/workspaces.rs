use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Organizational methodology active for a workspace.
///
/// Determines which optional parameter set tasks in the workspace carry
/// (see `ApproachParams` in the task model).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "work_approach", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkApproach {
    #[default]
    Calendar,
    Gtd,
    Kanban,
    Eisenhower,
}

/// Which tasks a plain member may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskVisibility {
    #[default]
    All,
    AssignedOnly,
}

/// Typed workspace settings.
///
/// The stored form is JSONB, but only this fixed set of keys is accepted;
/// unknown keys are rejected at deserialization time rather than silently
/// carried along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceSettings {
    #[serde(default = "default_true")]
    pub allow_members_to_create_tasks: bool,
    #[serde(default)]
    pub allow_member_invites: bool,
    #[serde(default)]
    pub task_visibility: TaskVisibility,
}

fn default_true() -> bool {
    true
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            allow_members_to_create_tasks: true,
            allow_member_invites: false,
            task_visibility: TaskVisibility::All,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub team_id: Option<Uuid>,
    pub active_approach: WorkApproach,
    pub default_tags: Vec<String>,
    pub settings: Json<WorkspaceSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub is_personal: bool,
    pub team_id: Option<Uuid>,
    pub active_approach: WorkApproach,
    pub default_tags: Vec<String>,
    pub settings: WorkspaceSettings,
}

/// Partial update for a workspace.
///
/// `None` leaves a field unchanged. For nullable columns the nested Option
/// distinguishes "not present" from "set to NULL":
/// - `None`: don't update the field
/// - `Some(None)`: set to NULL
/// - `Some(Some(value))`: set to value
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub active_approach: Option<WorkApproach>,
    pub default_tags: Option<Vec<String>>,
    pub settings: Option<WorkspaceSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings: WorkspaceSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.allow_members_to_create_tasks);
        assert!(!settings.allow_member_invites);
        assert_eq!(settings.task_visibility, TaskVisibility::All);
    }

    #[test]
    fn test_settings_reject_unknown_keys() {
        let result = serde_json::from_str::<WorkspaceSettings>(r#"{"theme":"dark"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = WorkspaceSettings {
            allow_members_to_create_tasks: false,
            allow_member_invites: true,
            task_visibility: TaskVisibility::AssignedOnly,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("allowMembersToCreateTasks"));
        assert!(json.contains("ASSIGNED_ONLY"));
        let back: WorkspaceSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_approach_default_and_wire_format() {
        assert_eq!(WorkApproach::default(), WorkApproach::Calendar);
        assert_eq!(
            serde_json::to_string(&WorkApproach::Eisenhower).unwrap(),
            "\"EISENHOWER\""
        );
        assert_eq!("GTD".parse::<WorkApproach>().unwrap(), WorkApproach::Gtd);
    }

}
