use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
///
/// Identity claims mirror what the external auth provider issues: subject is
/// the user id, email and display name ride along so the first request can
/// provision the user row.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user_id as string
    pub sub: String,
    /// User's email address
    pub email: String,
    /// User's display name (optional)
    pub name: Option<String>,
    /// Expiration time as Unix timestamp
    pub exp: i64,
    /// Issued at time as Unix timestamp
    pub iat: i64,
}

impl Claims {
    /// Parses the subject claim into a user id.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthenticated("Invalid user id in token".to_string()))
    }
}

/// Generates a JWT access token for a user
pub fn generate_jwt(
    user_id: Uuid,
    email: &str,
    name: Option<&str>,
    secret: &str,
    expiration_minutes: i64,
) -> Result<String> {
    let now = Utc::now();
    let expiration = now + Duration::minutes(expiration_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| Error::Internal(format!("Failed to generate JWT: {}", e)))
}

/// Verifies a JWT token and returns the claims if valid
///
/// # Errors
/// Returns `Unauthenticated` if the token is invalid, expired, or has a bad
/// signature.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        let error_msg = e.to_string().to_lowercase();
        if error_msg.contains("expired") {
            Error::Unauthenticated("Token has expired".to_string())
        } else if error_msg.contains("signature") {
            Error::Unauthenticated("Invalid token signature".to_string())
        } else {
            Error::Unauthenticated(format!("Invalid token: {}", e))
        }
    })?;

    Ok(token_data.claims)
}

/// Validates a JWT from the Authorization header or the access-token cookie
/// (header takes priority) and returns its claims.
pub fn authenticate_jwt_from_anywhere(
    auth_header: Option<&str>,
    cookie_token: Option<&str>,
    secret: &str,
) -> Result<Claims> {
    if let Some(header) = auth_header {
        let token = extract_token_from_header(Some(header))?;
        return verify_jwt(&token, secret);
    }
    match cookie_token {
        Some(token) if !token.is_empty() => verify_jwt(token, secret),
        _ => Err(Error::Unauthenticated(
            "Missing authentication token".to_string(),
        )),
    }
}

/// Extracts the Bearer token from the Authorization header
fn extract_token_from_header(auth_header: Option<&str>) -> Result<String> {
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = header[7..].to_string();
            if token.is_empty() {
                return Err(Error::Unauthenticated("Empty token".to_string()));
            }
            Ok(token)
        }
        Some(_) => Err(Error::Unauthenticated(
            "Invalid Authorization header format. Expected: 'Bearer <token>'".to_string(),
        )),
        None => Err(Error::Unauthenticated(
            "Missing Authorization header".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing";

    fn token_for(user_id: Uuid) -> String {
        generate_jwt(user_id, "user@example.com", Some("Test User"), SECRET, 15).unwrap()
    }

    #[test]
    fn test_generate_and_verify_round_trip() {
        let user_id = Uuid::now_v7();
        let token = token_for(user_id);
        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_verify_jwt_invalid_signature() {
        let token = token_for(Uuid::now_v7());
        let result = verify_jwt(&token, "wrong-secret");
        assert!(matches!(result, Err(Error::Unauthenticated(_))));
    }

    #[test]
    fn test_verify_jwt_invalid_format() {
        assert!(verify_jwt("invalid.token.here", SECRET).is_err());
    }

    #[test]
    fn test_authenticate_prefers_header_over_cookie() {
        let header_user = Uuid::now_v7();
        let cookie_user = Uuid::now_v7();
        let header = format!("Bearer {}", token_for(header_user));
        let cookie = token_for(cookie_user);

        let claims =
            authenticate_jwt_from_anywhere(Some(&header), Some(&cookie), SECRET).unwrap();
        assert_eq!(claims.sub, header_user.to_string());
    }

    #[test]
    fn test_authenticate_falls_back_to_cookie() {
        let user_id = Uuid::now_v7();
        let cookie = token_for(user_id);
        let claims = authenticate_jwt_from_anywhere(None, Some(&cookie), SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_authenticate_without_any_token() {
        let result = authenticate_jwt_from_anywhere(None, None, SECRET);
        assert!(matches!(result, Err(Error::Unauthenticated(_))));
    }

    #[test]
    fn test_extract_token_from_header_invalid_format() {
        assert!(extract_token_from_header(Some("InvalidFormat")).is_err());
        assert!(extract_token_from_header(Some("Bearer ")).is_err());
        assert!(extract_token_from_header(None).is_err());
    }
}
