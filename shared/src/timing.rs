use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs a query future and logs it when it takes at least `threshold`.
pub async fn timed<F, T>(name: &str, threshold: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let output = fut.await;
    let elapsed = started.elapsed();
    if is_slow(elapsed, threshold) {
        warn!(query = name, elapsed_ms = elapsed.as_millis() as u64, "Slow query");
    } else {
        debug!(query = name, elapsed_ms = elapsed.as_millis() as u64, "Query finished");
    }
    output
}

pub fn is_slow(elapsed: Duration, threshold: Duration) -> bool {
    !threshold.is_zero() && elapsed >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_threshold() {
        let threshold = Duration::from_millis(1000);
        assert!(is_slow(Duration::from_millis(1000), threshold));
        assert!(is_slow(Duration::from_millis(2500), threshold));
        assert!(!is_slow(Duration::from_millis(999), threshold));
        // zero disables slow logging
        assert!(!is_slow(Duration::from_secs(10), Duration::ZERO));
    }

    #[tokio::test]
    async fn returns_inner_output() {
        let value = timed("noop", Duration::from_secs(1), async { 42 }).await;
        assert_eq!(value, 42);
    }
}
