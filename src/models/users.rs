use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identity plus gamification state.
///
/// Identity (id, email) comes from the external auth provider via the JWT;
/// the gamification counters are owned here and mutated only as side effects
/// of task and pomodoro completion.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub level: i32,
    pub xp: i64,
    pub streak_count: i32,
    pub total_tasks_completed: i32,
    pub total_pomodoro_completed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}
