pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use cache::{Cache, CacheConfig};
pub use config::Config;
pub use database::{DbConn, DbPool};
pub use error::{Error, Result};
pub use state::AppState;

/// Load configuration from environment variables
pub fn load_config() -> std::result::Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}
