//! Health check handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// Public health check response
///
/// Simple status indicator for load balancers and health monitoring.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
}

/// GET /api/v1/health
///
/// Basic health monitoring endpoint. Does not require authentication and
/// does not touch the database.
pub async fn health_check(State(_state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}
