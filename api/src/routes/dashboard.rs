use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use shared::repo::dashboard::summary_cache_key;
use shared::DashboardRow;

use super::{cached, SharedState};
use crate::error::ApiResult;

pub async fn summary(State(state): State<SharedState>) -> ApiResult<Json<Vec<DashboardRow>>> {
    let key = summary_cache_key();
    Ok(Json(cached(&state.cache, &key, state.dashboard.summary()).await?))
}

pub async fn refresh(State(state): State<SharedState>) -> ApiResult<Json<Value>> {
    let cleared = state.dashboard.refresh_and_invalidate(&state.cache).await?;
    Ok(Json(json!({ "status": "refreshed", "cache_entries_cleared": cleared })))
}
