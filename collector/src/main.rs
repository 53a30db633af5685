use anyhow::Result;
use shared::{get_pool, Cache, Config};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

mod collect;
mod schedule;
mod sources;

use collect::Collector;

#[tokio::main]
async fn main() -> Result<()> {
    shared::logging::init();

    info!("Starting data collector...");

    let config = Config::from_env()?;
    let pool = get_pool(&config.database_url, config.database_max_connections).await?;
    info!("Connected to database");

    let cache = Cache::connect(&config.redis_url, config.cache_ttl).await;
    let collector = Arc::new(Collector::new(&config, pool, cache)?);
    info!(
        interval_secs = config.collector_interval.as_secs(),
        locations = config.weather_locations.len(),
        refresh_hour_utc = config.dashboard_refresh_hour_utc,
        "Collector configured"
    );

    let mut scheduler = schedule::start(Arc::clone(&collector), config.dashboard_refresh_hour_utc).await?;

    let mut ticker = interval(config.collector_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                collector.run_cycle().await;
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if let Err(e) = scheduler.shutdown().await {
        warn!("Scheduler shutdown failed: {}", e);
    }
    info!("Collector stopped");
    Ok(())
}
