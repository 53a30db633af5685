use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;

pub type Redis = Client;

const KEY_PREFIX: &str = "docker-project";

pub fn get_redis_client(redis_url: &str) -> Result<Redis> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

pub async fn get_connection_manager(redis_url: &str) -> Result<ConnectionManager> {
    let client = get_redis_client(redis_url)?;
    Ok(client.get_connection_manager().await?)
}

/// Builds a namespaced cache key: `docker-project:a:b:c`.
pub fn cache_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = KEY_PREFIX.to_string();
    for part in parts {
        key.push(':');
        key.push_str(part.as_ref());
    }
    key
}

/// JSON response cache in Redis. Errors are logged and read as misses.
#[derive(Clone)]
pub struct Cache {
    conn: Option<ConnectionManager>,
    ttl: Duration,
}

impl Cache {
    pub fn new(conn: ConnectionManager, ttl: Duration) -> Self {
        Self { conn: Some(conn), ttl }
    }

    /// A cache that never stores anything, used when Redis is unreachable at startup.
    pub fn disabled(ttl: Duration) -> Self {
        Self { conn: None, ttl }
    }

    pub async fn connect(redis_url: &str, ttl: Duration) -> Self {
        match get_connection_manager(redis_url).await {
            Ok(conn) => Self::new(conn, ttl),
            Err(e) => {
                warn!("Redis unavailable, response caching disabled: {}", e);
                Self::disabled(ttl)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;
        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, "Cache read failed: {}", e);
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, "Discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, "Cache encode failed: {}", e);
                return;
            }
        };
        let ttl = self.ttl.as_secs().max(1);
        if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, ttl).await {
            warn!(key, "Cache write failed: {}", e);
        }
    }

    /// Deletes every key starting with `prefix`. Returns how many were removed.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let Some(mut conn) = self.conn.clone() else {
            return 0;
        };
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let scanned: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await;
            let (next, keys) = match scanned {
                Ok(page) => page,
                Err(e) => {
                    warn!(prefix, "Cache invalidation failed: {}", e);
                    return removed;
                }
            };
            if !keys.is_empty() {
                match conn.del::<_, usize>(&keys).await {
                    Ok(n) => removed += n,
                    Err(e) => warn!(prefix, "Cache delete failed: {}", e),
                }
            }
            if next == 0 {
                return removed;
            }
            cursor = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespaced_keys() {
        assert_eq!(cache_key(["crypto", "BTC", "daily"]), "docker-project:crypto:BTC:daily");
        assert_eq!(cache_key(Vec::<String>::new()), "docker-project");
    }

    #[tokio::test]
    async fn disabled_cache_is_always_a_miss() {
        let cache = Cache::disabled(Duration::from_secs(60));
        cache.set_json("docker-project:x", &vec![1, 2, 3]).await;
        let hit: Option<Vec<i32>> = cache.get_json("docker-project:x").await;
        assert!(hit.is_none());
        assert_eq!(cache.invalidate_prefix("docker-project").await, 0);
        assert!(!cache.is_enabled());
    }
}
