use anyhow::Result;
use shared::repo::{
    DashboardRepository, LoginAttemptRepository, PerformanceRepository, UserRepository, WeatherRepository,
    WidgetRepository,
};
use shared::{get_connection_manager, get_db_connection, get_pool, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use webapp::session::SessionStore;
use webapp::tasks::spawn_attempt_pruner;
use webapp::throttle::LoginThrottle;
use webapp::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    shared::logging::init();

    info!("Starting dashboard web app...");

    let config = Config::from_env()?;
    let pool = get_pool(&config.database_url, config.database_max_connections).await?;
    let db = Arc::new(get_db_connection(&config.database_url).await?);
    info!("Connected to database");

    let redis = get_connection_manager(&config.redis_url).await?;
    info!("Connected to Redis");

    let slow = config.slow_query_threshold;
    let attempts = LoginAttemptRepository::new(db.clone());
    let state = Arc::new(AppState {
        users: UserRepository::new(db.clone()),
        attempts: attempts.clone(),
        widgets: WidgetRepository::new(db),
        dashboard: DashboardRepository::new(pool.clone(), slow),
        weather: WeatherRepository::new(pool.clone(), slow),
        performance: PerformanceRepository::new(pool, slow),
        sessions: SessionStore::new(redis, config.session_ttl, config.session_cookie_secure),
        throttle: LoginThrottle::new(config.login_max_attempts.max(0) as u64, config.login_window),
        config,
    });

    if state.users.count().await? == 0 {
        warn!("No users exist yet; create one with `manage_users create <username> <password>`");
    }

    spawn_attempt_pruner(attempts, state.config.login_attempt_retention_days);

    let bind = state.config.webapp_bind.clone();
    let app = webapp::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Web app listening on http://{}", bind);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    info!("Web app stopped");
    Ok(())
}
