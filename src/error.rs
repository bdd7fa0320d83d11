use thiserror::Error;

// Import Axum types for HTTP response conversion
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A validation error (required field missing or malformed).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A permission denied error (caller lacks the required role or ownership).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A conflict error (resource already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An authentication error (no caller identity or invalid token).
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A cache operation error.
    #[error("Cache error: {0}")]
    Cache(String),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error already carries a specific, caller-facing kind.
    ///
    /// Classified errors are surfaced verbatim; everything else is reported
    /// as a generic internal failure so store internals do not leak.
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::NotFound(_)
                | Error::PermissionDenied(_)
                | Error::Conflict(_)
                | Error::Unauthenticated(_)
        )
    }
}

/// Convert custom Error to HTTP response
///
/// This implementation maps each error variant to an appropriate HTTP status code
/// and returns a JSON response with an error message and error code.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = match &self {
            Error::Validation(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "INVALID_ARGUMENT"
                })
            }
            Error::NotFound(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "NOT_FOUND"
                })
            }
            Error::PermissionDenied(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "PERMISSION_DENIED"
                })
            }
            Error::Conflict(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "CONFLICT"
                })
            }
            Error::Unauthenticated(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "UNAUTHENTICATED"
                })
            }
            Error::Sqlx(_) => {
                serde_json::json!({
                    "error": "Database error",
                    "code": "INTERNAL"
                })
            }
            Error::Internal(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "INTERNAL"
                })
            }
            Error::Config(_) => {
                serde_json::json!({
                    "error": "Configuration error",
                    "code": "INTERNAL"
                })
            }
            Error::Cache(msg) => {
                serde_json::json!({
                    "error": msg,
                    "code": "CACHE_ERROR"
                })
            }
        };

        let status = match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_errors_keep_their_kind() {
        assert!(Error::Validation("bad".into()).is_classified());
        assert!(Error::NotFound("gone".into()).is_classified());
        assert!(Error::PermissionDenied("no".into()).is_classified());
        assert!(Error::Conflict("dup".into()).is_classified());
        assert!(Error::Unauthenticated("who".into()).is_classified());
    }

    #[test]
    fn test_unclassified_errors_are_internal() {
        assert!(!Error::Internal("boom".into()).is_classified());
        assert!(!Error::Cache("miss".into()).is_classified());
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Validation("v".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("n".into()), StatusCode::NOT_FOUND),
            (Error::PermissionDenied("p".into()), StatusCode::FORBIDDEN),
            (Error::Conflict("c".into()), StatusCode::CONFLICT),
            (Error::Unauthenticated("u".into()), StatusCode::UNAUTHORIZED),
            (
                Error::Internal("i".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
