use axum::extract::State;
use axum::Json;
use backtest::prelude::BacktestResult;

use super::SharedState;
use crate::error::ApiResult;
use crate::runner::{resolve_strategy, run_batch, run_one, BacktestRequest, BatchBacktestRequest, BatchResponse};

pub async fn single(
    State(state): State<SharedState>,
    Json(request): Json<BacktestRequest>,
) -> ApiResult<Json<BacktestResult>> {
    let strategy = resolve_strategy(&state.crypto, &request.spec).await?;
    let result = run_one(&state.crypto, request.crypto_id, &strategy, &request.spec).await?;
    Ok(Json(result))
}

pub async fn batch(
    State(state): State<SharedState>,
    Json(request): Json<BatchBacktestRequest>,
) -> ApiResult<Json<BatchResponse>> {
    let response = run_batch(&state.crypto, &request, state.config.backtest_batch_max).await?;
    Ok(Json(response))
}
