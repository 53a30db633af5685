//! Database diagnostics. Always read live, never cached.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use shared::repo::performance::{DatabaseHealth, HypertableInfo, IndexUsage, SlowQueryReport, TableStats};
use std::time::Duration;

use super::SharedState;
use crate::error::{ApiError, ApiResult};

const DEFAULT_SLOW_QUERY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SlowQueryParams {
    pub threshold_ms: Option<u64>,
    pub limit: Option<i64>,
}

pub async fn health(State(state): State<SharedState>) -> ApiResult<Json<DatabaseHealth>> {
    Ok(Json(state.performance.health().await?))
}

pub async fn tables(State(state): State<SharedState>) -> ApiResult<Json<Vec<TableStats>>> {
    Ok(Json(state.performance.table_stats().await?))
}

pub async fn indexes(State(state): State<SharedState>) -> ApiResult<Json<Vec<IndexUsage>>> {
    Ok(Json(state.performance.index_usage().await?))
}

pub async fn slow_queries(
    State(state): State<SharedState>,
    Query(params): Query<SlowQueryParams>,
) -> ApiResult<Json<SlowQueryReport>> {
    let limit = params.limit.unwrap_or(DEFAULT_SLOW_QUERY_LIMIT);
    if limit <= 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }
    let threshold = params
        .threshold_ms
        .map(Duration::from_millis)
        .unwrap_or(state.config.slow_query_threshold);
    Ok(Json(state.performance.slow_queries(threshold, limit).await?))
}

pub async fn hypertables(State(state): State<SharedState>) -> ApiResult<Json<Vec<HypertableInfo>>> {
    Ok(Json(state.performance.hypertables().await?))
}
