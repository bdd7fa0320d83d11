use questline::{AppState, Cache, CacheConfig, load_config, routes};

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questline=debug,tower_http=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database.connection_string().expose_secret())
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let cache = Cache::new_local(CacheConfig {
        cleanup_interval_seconds: config.cache.cleanup_interval_seconds,
        default_ttl_seconds: Some(config.cache.response_cache_ttl_seconds),
    });
    let user_cache = Cache::new_local(CacheConfig {
        cleanup_interval_seconds: config.cache.cleanup_interval_seconds,
        default_ttl_seconds: Some(config.cache.user_cache_ttl_seconds),
    });

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, cache, user_cache, pool);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutting down");
}
