use anyhow::Result;
use axum::Router;
use shared::{get_pool, Cache, Config};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod routes;
mod runner;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    shared::logging::init();

    info!("Starting dashboard API server...");

    let config = Config::from_env()?;
    let pool = get_pool(&config.database_url, config.database_max_connections).await?;
    info!("Connected to database");

    let cache = Cache::connect(&config.redis_url, config.cache_ttl).await;
    if cache.is_enabled() {
        info!("Response cache enabled (ttl {}s)", config.cache_ttl.as_secs());
    }

    let bind = config.api_bind.clone();
    let state = Arc::new(AppState::new(config, pool, cache));

    let app: Router = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("API server listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
