use axum::extract::{Path, Query, State};
use axum::Json;
use shared::{cache_key, PriceBar, Stock, TimeRange};

use super::{cached, key_part, SharedState};
use crate::error::ApiResult;

pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Stock>>> {
    let key = cache_key(["stocks", "list"]);
    Ok(Json(cached(&state.cache, &key, state.stocks.list_stocks()).await?))
}

pub async fn prices(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Json<Vec<PriceBar>>> {
    range.validate()?;
    let key = cache_key([
        "stocks".to_string(),
        symbol.to_uppercase(),
        "prices".to_string(),
        key_part(&range.start.map(|t| t.timestamp())),
        key_part(&range.end.map(|t| t.timestamp())),
        key_part(&range.limit),
    ]);
    let bars = cached(&state.cache, &key, async {
        let stock = state.stocks.find_stock_by_symbol(&symbol).await?;
        state.stocks.prices(stock.id, &range).await
    })
    .await?;
    Ok(Json(bars))
}
