//! Workspace access control middleware
//!
//! This module provides middleware for validating workspace membership
//! for protected workspace routes, resolving the caller's role once so
//! handlers and services can compare privilege levels without re-querying.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    models::workspace_members::WorkspaceRole,
    services::memberships,
    state::AppState,
};

/// Workspace access context added to request extensions
///
/// Added by the workspace access middleware after the caller's membership
/// has been validated.
#[derive(Debug, Clone)]
pub struct WorkspaceAccess {
    /// The workspace ID being accessed
    pub workspace_id: Uuid,
    /// The authenticated user's ID
    pub user_id: Uuid,
    /// The caller's role within the workspace
    pub role: WorkspaceRole,
}

/// Middleware to validate workspace access control
///
/// 1. Extracts workspace_id from the request path
/// 2. Resolves the caller's membership (no membership is always
///    `PermissionDenied`, even when the workspace does not exist)
/// 3. Adds `WorkspaceAccess` with the caller's role to request extensions
///
/// Runs after `jwt_auth_middleware`; apply to workspace-scoped routes with
/// `route_layer(middleware::from_fn_with_state(state, workspace_access_middleware))`.
pub async fn workspace_access_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let workspace_id = extract_workspace_id(&request)?;

    let auth_user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| Error::Unauthenticated("User not authenticated".to_string()))?;
    let user_id = auth_user.id;

    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))?;

    let membership = memberships::require_membership(&mut conn, workspace_id, user_id).await?;

    let access = WorkspaceAccess {
        workspace_id,
        user_id,
        role: membership.role,
    };
    request.extensions_mut().insert(access);

    Ok(next.run(request).await)
}

/// Extract workspace_id from request path
///
/// Supports paths like:
/// - /api/v1/workspaces/{workspace_id}
/// - /api/v1/workspaces/{workspace_id}/members
fn extract_workspace_id<B>(request: &Request<B>) -> Result<Uuid> {
    let path = request.uri().path();

    let segments: Vec<&str> = path.split('/').collect();

    // Two cases:
    // 1. /api/v1/workspaces/{workspace_id} - full path (not nested)
    // 2. /{workspace_id} - nested router path (prefix already stripped)
    let workspace_id_str = if let Some(pos) = segments.iter().position(|&s| s == "workspaces") {
        segments.get(pos + 1)
    } else {
        segments.iter().find(|s| !s.is_empty())
    }
    .ok_or_else(|| Error::Validation("Workspace ID not found in path".to_string()))?;

    Uuid::parse_str(workspace_id_str)
        .map_err(|_| Error::Validation("Invalid workspace ID format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_workspace_id_from_path() {
        let request = Request::builder()
            .uri("/api/v1/workspaces/123e4567-e89b-12d3-a456-426614174000")
            .body("test body")
            .unwrap();

        let workspace_id = extract_workspace_id(&request).unwrap();
        assert_eq!(
            workspace_id.to_string(),
            "123e4567-e89b-12d3-a456-426614174000"
        );
    }

    #[test]
    fn test_extract_workspace_id_with_trailing_path() {
        let request = Request::builder()
            .uri("/api/v1/workspaces/123e4567-e89b-12d3-a456-426614174000/members")
            .body("test body")
            .unwrap();

        let workspace_id = extract_workspace_id(&request).unwrap();
        assert_eq!(
            workspace_id.to_string(),
            "123e4567-e89b-12d3-a456-426614174000"
        );
    }

    #[test]
    fn test_extract_workspace_id_missing() {
        let request = Request::builder()
            .uri("/api/v1/users/123")
            .body("test body")
            .unwrap();

        assert!(extract_workspace_id(&request).is_err());
    }

    #[test]
    fn test_extract_workspace_id_invalid_uuid() {
        let request = Request::builder()
            .uri("/api/v1/workspaces/not-a-uuid")
            .body("test body")
            .unwrap();

        assert!(extract_workspace_id(&request).is_err());
    }
}
