use anyhow::{bail, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::collect::Collector;

/// Six-field cron expression (with seconds) firing daily at `hour`:00 UTC.
pub fn daily_at(hour: u32) -> Result<String> {
    if hour > 23 {
        bail!("DASHBOARD_REFRESH_HOUR_UTC must be 0-23, got {}", hour);
    }
    Ok(format!("0 0 {} * * *", hour))
}

/// Starts the scheduler that refreshes the dashboard summary once a day.
pub async fn start(collector: Arc<Collector>, refresh_hour_utc: u32) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;
    let expression = daily_at(refresh_hour_utc)?;

    sched
        .add(Job::new_async(expression.as_str(), move |_uuid, _l| {
            let collector = Arc::clone(&collector);
            Box::pin(async move {
                info!("Running nightly dashboard refresh");
                collector.refresh_dashboard().await;
            })
        })?)
        .await?;

    sched.start().await?;
    info!(cron = %expression, "Dashboard refresh scheduled");
    Ok(sched)
}
