use chrono::{Duration, Utc};
use shared::repo::LoginAttemptRepository;
use tracing::{error, info};

const PRUNE_EVERY: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Deletes login attempts older than `retention_days`, once an hour.
pub fn spawn_attempt_pruner(attempts: LoginAttemptRepository, retention_days: i64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_EVERY);
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - Duration::days(retention_days);
            match attempts.prune_before(cutoff).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Pruned old login attempts"),
                Err(e) => error!("Failed to prune login attempts: {}", e),
            }
        }
    })
}
