use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Privilege level of a user within a workspace.
///
/// Variants are declared lowest-first so the derived `Ord` gives the
/// privilege ordering directly: `viewer < member < editor < manager <
/// admin < owner`. Authorization code compares with [`WorkspaceRole::at_least`]
/// instead of checking set membership per call site.
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
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "workspace_role", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkspaceRole {
    Viewer,
    Member,
    Editor,
    Manager,
    Admin,
    Owner,
}

impl WorkspaceRole {
    /// Returns true when this role carries at least the given privilege level.
    pub fn at_least(self, required: WorkspaceRole) -> bool {
        self >= required
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
}
