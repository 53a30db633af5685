use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{cache_key, CurrentWeather, HistoricWeather, TimeRange};

use super::{cached, key_part, SharedState};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CurrentQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoricQuery {
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

pub async fn current(
    State(state): State<SharedState>,
    Query(query): Query<CurrentQuery>,
) -> ApiResult<Json<Vec<CurrentWeather>>> {
    let key = cache_key(["weather".to_string(), "current".to_string(), key_part(&query.location)]);
    let rows = cached(&state.cache, &key, state.weather.current(query.location.as_deref())).await?;
    Ok(Json(rows))
}

pub async fn historic(
    State(state): State<SharedState>,
    Query(query): Query<HistoricQuery>,
) -> ApiResult<Json<Vec<HistoricWeather>>> {
    let location = query
        .location
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("location is required".to_string()))?;
    let range = TimeRange {
        start: query.start,
        end: query.end,
        limit: query.limit,
    };
    range.validate()?;

    let key = cache_key([
        "weather".to_string(),
        "historic".to_string(),
        location.clone(),
        key_part(&range.start.map(|t| t.timestamp())),
        key_part(&range.end.map(|t| t.timestamp())),
        key_part(&range.limit),
    ]);
    let rows = cached(&state.cache, &key, state.weather.historic(&location, &range)).await?;
    Ok(Json(rows))
}
