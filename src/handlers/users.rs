//! Profile handlers

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    queries,
    services::gamification,
    state::AppState,
};

/// GET /api/v1/me
///
/// Returns the caller's profile including gamification state (XP, level,
/// completion counters) and progress within the current level.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))?;

    let user = queries::users::get_user_by_id_optional(&mut conn, auth_user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let progress = gamification::xp_progress(user.xp);

    Ok(Json(serde_json::json!({
        "user": user,
        "progress": progress,
    })))
}
