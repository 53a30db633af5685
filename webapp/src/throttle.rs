use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::repo::LoginAttemptRepository;
use tracing::warn;

pub const TOO_MANY_ATTEMPTS: &str = "Too many failed login attempts. Please try again later.";

/// Storage the throttle counts attempts in.
#[async_trait]
pub trait AttemptLog: Send + Sync {
    async fn record(&self, ip: &str, username: Option<&str>, at: DateTime<Utc>) -> shared::Result<i64>;
    async fn mark_succeeded(&self, attempt_id: i64) -> shared::Result<()>;
    async fn discard(&self, attempt_id: i64) -> shared::Result<()>;
    async fn failures_since(&self, ip: &str, since: DateTime<Utc>) -> shared::Result<u64>;
    async fn nth_recent_failure(&self, ip: &str, since: DateTime<Utc>, nth: u64) -> shared::Result<Option<DateTime<Utc>>>;
}

#[async_trait]
impl AttemptLog for LoginAttemptRepository {
    async fn record(&self, ip: &str, username: Option<&str>, at: DateTime<Utc>) -> shared::Result<i64> {
        self.record_attempt(ip, username, false, at).await
    }

    async fn mark_succeeded(&self, attempt_id: i64) -> shared::Result<()> {
        LoginAttemptRepository::mark_succeeded(self, attempt_id).await
    }

    async fn discard(&self, attempt_id: i64) -> shared::Result<()> {
        self.delete_attempt(attempt_id).await
    }

    async fn failures_since(&self, ip: &str, since: DateTime<Utc>) -> shared::Result<u64> {
        self.failed_attempts_since(ip, since).await
    }

    async fn nth_recent_failure(&self, ip: &str, since: DateTime<Utc>, nth: u64) -> shared::Result<Option<DateTime<Utc>>> {
        LoginAttemptRepository::nth_recent_failure(self, ip, since, nth).await
    }
}

/// Per-address lockout over a sliding window of failed attempts.
#[derive(Debug, Clone, Copy)]
pub struct LoginThrottle {
    pub max_attempts: u64,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The attempt row is stored as a failure until `succeed` flips it.
    Admitted { attempt_id: i64 },
    Locked { retry_after: Option<DateTime<Utc>> },
}

impl LoginThrottle {
    pub fn new(max_attempts: u64, window: std::time::Duration) -> Self {
        Self {
            max_attempts,
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::minutes(15)),
        }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    pub fn is_locked(&self, failures: u64) -> bool {
        failures >= self.max_attempts
    }

    /// The lock lifts once the `max_attempts`-th most recent failure leaves the window.
    pub fn retry_after(&self, oldest_counted_failure: DateTime<Utc>) -> DateTime<Utc> {
        oldest_counted_failure + self.window
    }

    /// Records the attempt before counting, so concurrent attempts from one
    /// address see each other and at most `max_attempts` get through.
    pub async fn admit<L: AttemptLog + ?Sized>(
        &self,
        log: &L,
        ip: &str,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> shared::Result<Admission> {
        let since = self.window_start(now);
        let attempt_id = log.record(ip, username, now).await?;
        let earlier_failures = log.failures_since(ip, since).await?.saturating_sub(1);
        if !self.is_locked(earlier_failures) {
            return Ok(Admission::Admitted { attempt_id });
        }

        log.discard(attempt_id).await?;
        let retry_after = log
            .nth_recent_failure(ip, since, self.max_attempts)
            .await?
            .map(|t| self.retry_after(t));
        warn!(ip, failures = earlier_failures, ?retry_after, "Login throttled");
        Ok(Admission::Locked { retry_after })
    }

    pub async fn succeed<L: AttemptLog + ?Sized>(&self, log: &L, attempt_id: i64) -> shared::Result<()> {
        log.mark_succeeded(attempt_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        ip: String,
        success: bool,
        at: DateTime<Utc>,
    }

    #[derive(Default)]
    struct MemoryLog {
        next_id: AtomicI64,
        rows: Mutex<Vec<Row>>,
    }

    impl MemoryLog {
        fn failures(&self, ip: &str, since: DateTime<Utc>) -> Vec<DateTime<Utc>> {
            let mut times: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.ip == ip && !r.success && r.at >= since)
                .map(|r| r.at)
                .collect();
            times.sort_by(|a, b| b.cmp(a));
            times
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AttemptLog for MemoryLog {
        async fn record(&self, ip: &str, _username: Option<&str>, at: DateTime<Utc>) -> shared::Result<i64> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.rows.lock().unwrap().push(Row { id, ip: ip.to_string(), success: false, at });
            Ok(id)
        }

        async fn mark_succeeded(&self, attempt_id: i64) -> shared::Result<()> {
            for row in self.rows.lock().unwrap().iter_mut().filter(|r| r.id == attempt_id) {
                row.success = true;
            }
            Ok(())
        }

        async fn discard(&self, attempt_id: i64) -> shared::Result<()> {
            self.rows.lock().unwrap().retain(|r| r.id != attempt_id);
            Ok(())
        }

        async fn failures_since(&self, ip: &str, since: DateTime<Utc>) -> shared::Result<u64> {
            Ok(self.failures(ip, since).len() as u64)
        }

        async fn nth_recent_failure(&self, ip: &str, since: DateTime<Utc>, nth: u64) -> shared::Result<Option<DateTime<Utc>>> {
            Ok(self.failures(ip, since).get(nth.saturating_sub(1) as usize).copied())
        }
    }

    fn throttle() -> LoginThrottle {
        LoginThrottle::new(20, std::time::Duration::from_secs(15 * 60))
    }

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, second).unwrap()
    }

    #[test]
    fn locks_at_the_limit() {
        let t = throttle();
        assert!(!t.is_locked(0));
        assert!(!t.is_locked(19));
        assert!(t.is_locked(20));
        assert!(t.is_locked(21));
    }

    #[test]
    fn window_and_retry_after() {
        let t = throttle();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(t.window_start(now), Utc.with_ymd_and_hms(2024, 3, 1, 11, 45, 0).unwrap());

        let oldest = Utc.with_ymd_and_hms(2024, 3, 1, 11, 50, 0).unwrap();
        assert_eq!(t.retry_after(oldest), Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap());
    }

    #[test]
    fn zero_limit_always_locks() {
        let t = LoginThrottle::new(0, std::time::Duration::from_secs(60));
        assert!(t.is_locked(0));
    }

    #[tokio::test]
    async fn locks_after_max_failures_and_unlocks_when_window_passes() {
        let t = throttle();
        let log = MemoryLog::default();
        for i in 0..20 {
            let admission = t.admit(&log, "198.51.100.7", Some("alice"), at(0, i)).await.unwrap();
            assert!(matches!(admission, Admission::Admitted { .. }), "attempt {} was locked", i);
        }

        let locked = t.admit(&log, "198.51.100.7", Some("alice"), at(1, 0)).await.unwrap();
        assert_eq!(locked, Admission::Locked { retry_after: Some(at(15, 0)) });
        assert_eq!(log.len(), 20, "throttled attempts are not stored");

        let other = t.admit(&log, "203.0.113.9", Some("alice"), at(1, 0)).await.unwrap();
        assert!(matches!(other, Admission::Admitted { .. }));

        let still_locked = t.admit(&log, "198.51.100.7", None, at(14, 59)).await.unwrap();
        assert!(matches!(still_locked, Admission::Locked { .. }));

        let reopened = t.admit(&log, "198.51.100.7", Some("alice"), at(15, 1)).await.unwrap();
        assert!(matches!(reopened, Admission::Admitted { .. }));
    }

    #[tokio::test]
    async fn successful_logins_do_not_count() {
        let t = LoginThrottle::new(3, std::time::Duration::from_secs(15 * 60));
        let log = MemoryLog::default();
        for i in 0..10 {
            match t.admit(&log, "10.1.1.1", Some("alice"), at(0, i)).await.unwrap() {
                Admission::Admitted { attempt_id } => t.succeed(&log, attempt_id).await.unwrap(),
                Admission::Locked { .. } => panic!("attempt {} was locked", i),
            }
        }
        assert_eq!(log.failures_since("10.1.1.1", at(0, 0) - Duration::hours(1)).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_burst_admits_at_most_the_limit() {
        let t = LoginThrottle::new(5, std::time::Duration::from_secs(15 * 60));
        let log = Arc::new(MemoryLog::default());

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..40 {
            let log = Arc::clone(&log);
            tasks.spawn(async move { t.admit(log.as_ref(), "192.0.2.1", None, at(0, 0)).await.unwrap() });
        }

        let mut admitted = 0;
        while let Some(result) = tasks.join_next().await {
            if matches!(result.unwrap(), Admission::Admitted { .. }) {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);
        assert_eq!(log.len(), 5);
    }
}
