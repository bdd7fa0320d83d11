use crate::{cache::Cache, config::Config, database::DbPool, models::users::User};

/// Application state shared across all HTTP handlers
///
/// This struct contains shared resources that need to be accessed
/// by API handlers, such as the cache instances and database pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Cache for serialized list/detail responses
    pub cache: Cache<String>,
    /// Cache for authenticated user data
    pub user_cache: Cache<User>,
    /// Database connection pool
    pub pool: DbPool,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(config: Config, cache: Cache<String>, user_cache: Cache<User>, pool: DbPool) -> Self {
        Self {
            config,
            cache,
            user_cache,
            pool,
        }
    }
}
