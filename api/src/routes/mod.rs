use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use shared::Cache;
use std::future::Future;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;

mod backtesting;
mod crypto;
mod dashboard;
mod performance;
mod stocks;
mod weather;

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/crypto", get(crypto::list))
        .route("/api/crypto/strategies", get(crypto::strategies))
        .route("/api/crypto/backtest", post(backtesting::single))
        .route("/api/crypto/backtest/batch", post(backtesting::batch))
        .route("/api/crypto/:symbol/prices", get(crypto::prices))
        .route("/api/crypto/:symbol/daily", get(crypto::daily))
        .route("/api/crypto/:symbol/weekly", get(crypto::weekly))
        .route("/api/stocks", get(stocks::list))
        .route("/api/stocks/:symbol/prices", get(stocks::prices))
        .route("/api/weather/current", get(weather::current))
        .route("/api/weather/historic", get(weather::historic))
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/dashboard/refresh", post(dashboard::refresh))
        .route("/api/performance/database/health", get(performance::health))
        .route("/api/performance/tables", get(performance::tables))
        .route("/api/performance/indexes", get(performance::indexes))
        .route("/api/performance/slow-queries", get(performance::slow_queries))
        .route("/api/performance/hypertables", get(performance::hypertables))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves `key` from the cache, or runs `load` and stores its output.
pub(crate) async fn cached<T, F>(cache: &Cache, key: &str, load: F) -> ApiResult<T>
where
    T: Serialize + DeserializeOwned,
    F: Future<Output = shared::Result<T>>,
{
    if let Some(hit) = cache.get_json::<T>(key).await {
        return Ok(hit);
    }
    let value = load.await?;
    cache.set_json(key, &value).await;
    Ok(value)
}

/// Renders an optional query value as a cache key segment.
pub(crate) fn key_part<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = Cache::disabled(Duration::from_secs(60));
        let first: Vec<i32> = cached(&cache, "k", async { Ok(vec![1, 2]) }).await.unwrap();
        let second: Vec<i32> = cached(&cache, "k", async { Ok(vec![3]) }).await.unwrap();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![3]);
    }

    #[tokio::test]
    async fn load_errors_propagate() {
        let cache = Cache::disabled(Duration::from_secs(60));
        let result: ApiResult<Vec<i32>> =
            cached(&cache, "k", async { Err(shared::Error::NotFound("stock XYZ".into())) }).await;
        assert!(result.is_err());
    }

    #[test]
    fn key_parts() {
        assert_eq!(key_part::<i64>(&None), "-");
        assert_eq!(key_part(&Some(25)), "25");
    }
}
