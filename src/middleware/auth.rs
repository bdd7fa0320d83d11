//! JWT authentication middleware with user caching
//!
//! This module provides middleware for validating JWT tokens and caching
//! authenticated user data to reduce database queries.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cache::keys,
    error::{Error, Result},
    models::users::{NewUser, User},
    queries,
    services::jwt::authenticate_jwt_from_anywhere,
    state::AppState,
};

use secrecy::ExposeSecret;

/// Authenticated user extracted from JWT token
///
/// This struct is added to request extensions by the JWT middleware
/// after successful validation and caching.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub id: Uuid,
    /// User's email address
    pub email: String,
    /// User's display name (optional)
    pub display_name: Option<String>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// JWT authentication middleware with user caching
///
/// Validates JWT tokens from the Authorization header or the `access_token`
/// cookie (header takes priority), caches user details to reduce database
/// queries, and adds the authenticated user to request extensions.
///
/// The first authenticated request provisions the user row from the token's
/// identity claims, mirroring the original client's create-on-first-sign-in
/// behavior. Every failure mode is `Unauthenticated` (401).
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    // 1. Validate JWT from Authorization header OR Cookie
    let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
    let cookie_header = headers.get("cookie").and_then(|h| h.to_str().ok());
    let access_token = cookie_header.and_then(|h| extract_cookie_value(h, "access_token"));

    let claims = authenticate_jwt_from_anywhere(
        auth_header,
        access_token.as_deref(),
        state.config.jwt.secret.expose_secret(),
    )?;
    let user_id = claims.user_id()?;

    // 2. Check cache for user details
    let cache_key = keys::user(user_id);
    if let Some(cached_user) = state.user_cache.get(&cache_key).await? {
        request
            .extensions_mut()
            .insert(AuthenticatedUser::from(cached_user));
        return Ok(next.run(request).await);
    }

    // 3. Cache miss - load (or provision) the user row
    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| Error::Internal(format!("Failed to acquire database connection: {}", e)))?;
    let user = match queries::users::get_user_by_id_optional(&mut conn, user_id).await? {
        Some(user) => user,
        None => {
            tracing::info!(user_id = %user_id, "Provisioning user row on first request");
            queries::users::upsert_user(
                &mut conn,
                NewUser {
                    id: user_id,
                    email: claims.email.clone(),
                    display_name: claims.name.clone(),
                },
            )
            .await?
        }
    };

    // 4. Cache user details with the configured TTL
    state
        .user_cache
        .set_ex(
            &cache_key,
            user.clone(),
            state.config.cache.user_cache_ttl_seconds,
        )
        .await?;

    // 5. Add to extensions and continue
    request.extensions_mut().insert(AuthenticatedUser::from(user));
    Ok(next.run(request).await)
}

/// Extract specific cookie value from Cookie header
fn extract_cookie_value(cookie_str: &str, cookie_name: &str) -> Option<String> {
    cookie_str
        .split(';')
        .map(|s| s.trim())
        .find(|cookie| cookie.starts_with(&format!("{}=", cookie_name)))
        .and_then(|cookie| cookie.split('=').nth(1).map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cookie_value() {
        let cookie_str = "access_token=abc123; refresh_token=def456";
        assert_eq!(
            extract_cookie_value(cookie_str, "access_token"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_cookie_value(cookie_str, "refresh_token"),
            Some("def456".to_string())
        );
        assert_eq!(extract_cookie_value(cookie_str, "nonexistent"), None);
    }

    #[test]
    fn test_extract_cookie_value_with_spaces() {
        let cookie_str = "access_token=token123; other=value";
        assert_eq!(
            extract_cookie_value(cookie_str, "access_token"),
            Some("token123".to_string())
        );
    }

    #[test]
    fn test_extract_cookie_value_empty() {
        let cookie_str = "access_token=; other=value";
        // Empty cookie value returns empty string (not None)
        assert_eq!(
            extract_cookie_value(cookie_str, "access_token"),
            Some("".to_string())
        );
    }
}
