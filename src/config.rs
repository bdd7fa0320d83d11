use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub user: String,
    // Skipped during serialization so Display never leaks it; the default
    // fills the gap when the environment does not provide one.
    #[serde(skip_serializing, default = "default_db_password")]
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    #[serde(skip_serializing, default = "default_jwt_secret")]
    pub secret: SecretString,
    pub access_token_minutes: i64,
}

fn default_db_password() -> SecretString {
    "password".to_string().into()
}

fn default_jwt_secret() -> SecretString {
    "development-secret-change-me".to_string().into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// TTL for authenticated-user entries populated by the auth middleware.
    pub user_cache_ttl_seconds: u64,
    /// TTL for cached list/detail responses.
    pub response_cache_ttl_seconds: u64,
    /// Background cleanup interval for expired entries.
    pub cleanup_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            // Override with environment variables using `QUESTLINE__` prefix and `__` separator
            // e.g., QUESTLINE__DATABASE__USER="my_user"
            .add_source(
                config::Environment::with_prefix("QUESTLINE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl DatabaseConfig {
    /// Constructs the database connection string.
    pub fn connection_string(&self) -> SecretString {
        SecretString::from(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database
        ))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: default_db_password(),
            host: "localhost".to_string(),
            port: 5432,
            database: "questline".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            access_token_minutes: 15,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            user_cache_ttl_seconds: 300,
            response_cache_ttl_seconds: 60,
            cleanup_interval_seconds: 60,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets are skipped by serde during serialization
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.database, "questline");
        assert_eq!(config.jwt.access_token_minutes, 15);
        assert_eq!(config.cache.response_cache_ttl_seconds, 60);
    }

    #[test]
    fn test_connection_string_contains_components() {
        let config = DatabaseConfig::default();
        let conn = config.connection_string();
        let exposed = conn.expose_secret();
        assert!(exposed.starts_with("postgres://"));
        assert!(exposed.contains("localhost:5432"));
        assert!(exposed.ends_with("/questline"));
    }

    #[test]
    fn test_display_never_leaks_secrets() {
        let config = Config::default();
        let rendered = config.to_string();
        assert!(!rendered.contains("password"));
        assert!(!rendered.contains("development-secret-change-me"));
    }
}
