use axum::extract::{Path, Query, State};
use axum::Json;
use shared::repo::Interval;
use shared::{cache_key, Cryptocurrency, PriceBar, StrategyWithParameters, TimeRange};

use super::{cached, key_part, SharedState};
use crate::error::ApiResult;

pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    let key = cache_key(["crypto", "list"]);
    let cryptos = cached(&state.cache, &key, state.crypto.list_cryptocurrencies()).await?;
    Ok(Json(cryptos))
}

pub async fn strategies(State(state): State<SharedState>) -> ApiResult<Json<Vec<StrategyWithParameters>>> {
    let key = cache_key(["crypto", "strategies"]);
    let strategies = cached(&state.cache, &key, state.crypto.list_strategies()).await?;
    Ok(Json(strategies))
}

async fn bars_for(state: &SharedState, symbol: &str, interval: Interval, range: TimeRange) -> ApiResult<Vec<PriceBar>> {
    range.validate()?;
    let interval_name = match interval {
        Interval::Raw => "prices",
        Interval::Daily => "daily",
        Interval::Weekly => "weekly",
    };
    let key = cache_key([
        "crypto".to_string(),
        symbol.to_uppercase(),
        interval_name.to_string(),
        key_part(&range.start.map(|t| t.timestamp())),
        key_part(&range.end.map(|t| t.timestamp())),
        key_part(&range.limit),
    ]);
    cached(&state.cache, &key, async {
        let crypto = state.crypto.find_cryptocurrency_by_symbol(symbol).await?;
        state.crypto.bars(crypto.id, interval, &range).await
    })
    .await
}

pub async fn prices(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Json<Vec<PriceBar>>> {
    Ok(Json(bars_for(&state, &symbol, Interval::Raw, range).await?))
}

pub async fn daily(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Json<Vec<PriceBar>>> {
    Ok(Json(bars_for(&state, &symbol, Interval::Daily, range).await?))
}

pub async fn weekly(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Json<Vec<PriceBar>>> {
    Ok(Json(bars_for(&state, &symbol, Interval::Weekly, range).await?))
}
