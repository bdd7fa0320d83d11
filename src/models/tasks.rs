use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

/// Task priority, ordered lowest-first so sorting by priority is the
/// derived `Ord`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrogDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarParams {
    pub event_id: Option<String>,
    pub is_all_day: bool,
    pub recurrence_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GtdParams {
    pub context: Option<String>,
    pub next_action: bool,
    pub project_link: Option<String>,
    pub waiting_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EisenhowerParams {
    pub urgency: i32,
    pub importance: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrogParams {
    pub is_frog: bool,
    pub difficulty: FrogDifficulty,
}

/// Methodology-specific task parameters.
///
/// Externally tagged so the stored/wire form is `{"calendar": {...}}`,
/// `{"gtd": {...}}` etc., carrying exactly one parameter set that should
/// match the workspace's active approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApproachParams {
    Calendar(CalendarParams),
    Gtd(GtdParams),
    Eisenhower(EisenhowerParams),
    Frog(FrogParams),
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub workspace_id: Uuid,
    pub tags: Vec<String>,
    pub pomodoro_estimated_cycles: Option<i32>,
    pub pomodoro_estimated_minutes: Option<i32>,
    pub pomodoro_count: i32,
    pub approach_params: Option<Json<ApproachParams>>,
    pub order_in_list: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub workspace_id: Uuid,
    pub creator_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub pomodoro_estimated_cycles: Option<i32>,
    pub pomodoro_estimated_minutes: Option<i32>,
    pub approach_params: Option<ApproachParams>,
    pub order_in_list: i32,
}

/// Partial update for a task.
///
/// Same semantics as `UpdateWorkspace`: `None` leaves the field unchanged,
/// the nested Option on nullable columns distinguishes "absent" from
/// "set to NULL". Status is deliberately not updatable through this path;
/// transitions go through the dedicated status operation so the completion
/// side effect cannot be bypassed.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub assignee_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub pomodoro_estimated_cycles: Option<Option<i32>>,
    pub pomodoro_estimated_minutes: Option<Option<i32>>,
    pub approach_params: Option<Option<ApproachParams>>,
    pub order_in_list: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!(TaskStatus::Todo.to_string(), "TODO");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::High < TaskPriority::Critical);
    }

    #[test]
    fn test_approach_params_externally_tagged() {
        let params = ApproachParams::Eisenhower(EisenhowerParams {
            urgency: 3,
            importance: 4,
        });
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["eisenhower"]["urgency"], 3);
        assert_eq!(json["eisenhower"]["importance"], 4);

        let gtd: ApproachParams = serde_json::from_value(serde_json::json!({
            "gtd": {
                "context": "@home",
                "nextAction": true,
                "projectLink": null,
                "waitingFor": null
            }
        }))
        .unwrap();
        match gtd {
            ApproachParams::Gtd(p) => {
                assert_eq!(p.context.as_deref(), Some("@home"));
                assert!(p.next_action);
            }
            other => panic!("expected gtd params, got {:?}", other),
        }
    }

    #[test]
    fn test_frog_params_wire_format() {
        let params = ApproachParams::Frog(FrogParams {
            is_frog: true,
            difficulty: FrogDifficulty::Hard,
        });
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["frog"]["isFrog"], true);
        assert_eq!(json["frog"]["difficulty"], "HARD");
    }

}
