//! Loads price bars, resolves a strategy and runs the backtest engine,
//! either for one cryptocurrency or for a batch.

use async_trait::async_trait;
use backtest::prelude::*;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::repo::{CryptoRepository, Interval};
use shared::{Cryptocurrency, PriceBar, StrategyWithParameters, TimeRange};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

/// Where the runner reads its inputs from.
#[async_trait]
pub trait BacktestSource: Send + Sync {
    async fn cryptocurrency(&self, crypto_id: i32) -> shared::Result<Cryptocurrency>;
    async fn bars(&self, crypto_id: i32, interval: Interval, range: &TimeRange) -> shared::Result<Vec<PriceBar>>;
    async fn strategy(&self, strategy_id: i32) -> shared::Result<StrategyWithParameters>;
}

#[async_trait]
impl BacktestSource for CryptoRepository {
    async fn cryptocurrency(&self, crypto_id: i32) -> shared::Result<Cryptocurrency> {
        self.find_cryptocurrency(crypto_id).await
    }

    async fn bars(&self, crypto_id: i32, interval: Interval, range: &TimeRange) -> shared::Result<Vec<PriceBar>> {
        CryptoRepository::bars(self, crypto_id, interval, range).await
    }

    async fn strategy(&self, strategy_id: i32) -> shared::Result<StrategyWithParameters> {
        self.find_strategy(strategy_id).await
    }
}

/// Everything about a run except which cryptocurrency it is for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BacktestSpec {
    /// Stored strategy whose type and parameters are used as defaults
    pub strategy_id: Option<i32>,
    /// Strategy type, required when `strategy_id` is absent
    pub strategy_type: Option<String>,
    /// Overrides on top of the stored parameters
    #[serde(default)]
    pub parameters: StrategyParams,
    #[serde(default)]
    pub interval: Interval,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config: BacktestConfig,
}

#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub crypto_id: i32,
    #[serde(flatten)]
    pub spec: BacktestSpec,
}

#[derive(Debug, Deserialize)]
pub struct BatchBacktestRequest {
    pub crypto_ids: Vec<i32>,
    #[serde(flatten)]
    pub spec: BacktestSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStrategy {
    pub kind: String,
    pub params: StrategyParams,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub crypto_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BacktestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub strategy: String,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchItem>,
}

pub async fn resolve_strategy<S: BacktestSource + ?Sized>(source: &S, spec: &BacktestSpec) -> ApiResult<ResolvedStrategy> {
    match (spec.strategy_id, spec.strategy_type.as_deref()) {
        (Some(id), requested) => {
            let stored = source.strategy(id).await?;
            let kind = requested.unwrap_or(&stored.strategy.strategy_type).to_string();
            let params = StrategyParams::from(stored.parameters).merged(&spec.parameters);
            Ok(ResolvedStrategy { kind, params })
        }
        (None, Some(kind)) => Ok(ResolvedStrategy {
            kind: kind.to_string(),
            params: spec.parameters.clone(),
        }),
        (None, None) => Err(ApiError::BadRequest(
            "either strategy_id or strategy_type is required".to_string(),
        )),
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn interval_name(interval: Interval) -> &'static str {
    match interval {
        Interval::Raw => "raw",
        Interval::Daily => "daily",
        Interval::Weekly => "weekly",
    }
}

pub fn to_series(symbol: &str, interval: Interval, bars: &[PriceBar]) -> CandleSeries {
    let timeframe = interval_name(interval);
    CandleSeries::from_vec(
        bars.iter()
            .map(|bar| {
                Candle::new(
                    to_f64(bar.open),
                    to_f64(bar.high),
                    to_f64(bar.low),
                    to_f64(bar.close),
                    to_f64(bar.volume),
                    bar.time,
                    symbol.to_string(),
                    timeframe.to_string(),
                )
            })
            .collect(),
    )
}

pub async fn run_one<S: BacktestSource + ?Sized>(
    source: &S,
    crypto_id: i32,
    strategy: &ResolvedStrategy,
    spec: &BacktestSpec,
) -> ApiResult<BacktestResult> {
    let crypto = source.cryptocurrency(crypto_id).await?;
    let range = TimeRange {
        start: spec.start,
        end: spec.end,
        limit: None,
    };
    let bars = source.bars(crypto_id, spec.interval, &range).await?;
    let series = to_series(&crypto.symbol, spec.interval, &bars);

    let mut built = build_strategy(&strategy.kind, &strategy.params)?;
    let engine = BacktestEngine::new(spec.config.clone());
    let result = engine.run(built.as_mut(), &series)?;

    info!(
        crypto = %crypto.symbol,
        strategy = %strategy.kind,
        trades = result.num_trades,
        "Backtest finished with {:.2}% return",
        result.total_return_percent
    );
    Ok(result)
}

/// Runs one backtest per requested id, in request order. Duplicates run again;
/// a failing id yields an item carrying the error instead of failing the batch.
pub async fn run_batch<S: BacktestSource + ?Sized>(
    source: &S,
    request: &BatchBacktestRequest,
    max_items: usize,
) -> ApiResult<BatchResponse> {
    if request.crypto_ids.is_empty() {
        return Err(ApiError::BadRequest("crypto_ids must not be empty".to_string()));
    }
    if request.crypto_ids.len() > max_items {
        return Err(ApiError::BadRequest(format!(
            "at most {} crypto_ids per batch, got {}",
            max_items,
            request.crypto_ids.len()
        )));
    }

    let strategy = resolve_strategy(source, &request.spec).await?;
    // Fail fast on a bad strategy rather than once per item.
    build_strategy(&strategy.kind, &strategy.params)?;

    let mut results = Vec::with_capacity(request.crypto_ids.len());
    for &crypto_id in &request.crypto_ids {
        let item = match run_one(source, crypto_id, &strategy, &request.spec).await {
            Ok(result) => BatchItem {
                crypto_id,
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!(crypto_id, "Batch backtest item failed: {}", e);
                BatchItem {
                    crypto_id,
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(item);
    }

    let failed = results.iter().filter(|item| item.error.is_some()).count();
    Ok(BatchResponse {
        strategy: strategy.kind,
        succeeded: results.len() - failed,
        failed,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use shared::CryptoStrategy;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Default)]
    struct MemorySource {
        cryptos: HashMap<i32, (Cryptocurrency, Vec<PriceBar>)>,
        strategies: HashMap<i32, StrategyWithParameters>,
    }

    impl MemorySource {
        fn with_crypto(mut self, id: i32, symbol: &str, closes: &[i64]) -> Self {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let bars = closes
                .iter()
                .enumerate()
                .map(|(i, &close)| {
                    let price = Decimal::from(close);
                    PriceBar {
                        time: start + Duration::days(i as i64),
                        open: price,
                        high: price,
                        low: price,
                        close: price,
                        volume: Decimal::from(1),
                    }
                })
                .collect();
            let crypto = Cryptocurrency {
                id,
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                coingecko_id: None,
            };
            self.cryptos.insert(id, (crypto, bars));
            self
        }

        fn with_strategy(mut self, id: i32, kind: &str, params: &[(&str, &str)]) -> Self {
            let parameters: BTreeMap<String, String> =
                params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            self.strategies.insert(
                id,
                StrategyWithParameters {
                    strategy: CryptoStrategy {
                        id,
                        name: format!("{} preset", kind),
                        strategy_type: kind.to_string(),
                        description: None,
                    },
                    parameters,
                },
            );
            self
        }
    }

    #[async_trait]
    impl BacktestSource for MemorySource {
        async fn cryptocurrency(&self, crypto_id: i32) -> shared::Result<Cryptocurrency> {
            self.cryptos
                .get(&crypto_id)
                .map(|(crypto, _)| crypto.clone())
                .ok_or_else(|| shared::Error::NotFound(format!("cryptocurrency {}", crypto_id)))
        }

        async fn bars(&self, crypto_id: i32, _interval: Interval, _range: &TimeRange) -> shared::Result<Vec<PriceBar>> {
            Ok(self.cryptos.get(&crypto_id).map(|(_, bars)| bars.clone()).unwrap_or_default())
        }

        async fn strategy(&self, strategy_id: i32) -> shared::Result<StrategyWithParameters> {
            self.strategies
                .get(&strategy_id)
                .cloned()
                .ok_or_else(|| shared::Error::NotFound(format!("strategy {}", strategy_id)))
        }
    }

    fn buy_and_hold() -> BacktestSpec {
        BacktestSpec {
            strategy_type: Some("buy_and_hold".to_string()),
            ..Default::default()
        }
    }

    fn source() -> MemorySource {
        MemorySource::default()
            .with_crypto(1, "BTC", &[100, 110, 120, 130])
            .with_crypto(2, "ETH", &[50, 45, 40, 60])
    }

    #[tokio::test]
    async fn batch_keeps_request_order_and_duplicates() {
        let request = BatchBacktestRequest {
            crypto_ids: vec![2, 1, 99, 2],
            spec: buy_and_hold(),
        };
        let response = run_batch(&source(), &request, 10).await.unwrap();

        let ids: Vec<i32> = response.results.iter().map(|item| item.crypto_id).collect();
        assert_eq!(ids, vec![2, 1, 99, 2]);
        assert_eq!(response.succeeded, 3);
        assert_eq!(response.failed, 1);

        let missing = &response.results[2];
        assert!(missing.result.is_none());
        assert_eq!(missing.error.as_deref(), Some("cryptocurrency 99 not found"));

        let first = response.results[0].result.as_ref().unwrap();
        let last = response.results[3].result.as_ref().unwrap();
        assert_eq!(first.symbol, "ETH");
        assert_eq!(first.final_equity, last.final_equity);
    }

    #[tokio::test]
    async fn batch_rejects_empty_and_oversized_requests() {
        let empty = BatchBacktestRequest {
            crypto_ids: vec![],
            spec: buy_and_hold(),
        };
        assert!(matches!(run_batch(&source(), &empty, 10).await, Err(ApiError::BadRequest(_))));

        let oversized = BatchBacktestRequest {
            crypto_ids: vec![1, 2, 1],
            spec: buy_and_hold(),
        };
        assert!(matches!(run_batch(&source(), &oversized, 2).await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn batch_fails_whole_request_on_unknown_strategy() {
        let request = BatchBacktestRequest {
            crypto_ids: vec![1],
            spec: BacktestSpec {
                strategy_type: Some("astrology".to_string()),
                ..Default::default()
            },
        };
        let err = run_batch(&source(), &request, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Backtest(BacktestError::UnknownStrategy(_))));
    }

    #[tokio::test]
    async fn single_run_produces_one_equity_point_per_bar() {
        let strategy = resolve_strategy(&source(), &buy_and_hold()).await.unwrap();
        let result = run_one(&source(), 1, &strategy, &buy_and_hold()).await.unwrap();
        assert_eq!(result.equity_curve.len(), 4);
        assert_eq!(result.timeframe, "daily");
        let pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
        assert!((result.final_equity - (result.initial_capital + pnl)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn stored_parameters_are_overridden_by_request() {
        let source = source().with_strategy(7, "sma_crossover", &[("fast", "10"), ("slow", "30")]);
        let mut overrides = StrategyParams::default();
        overrides.set("fast", "5");
        let spec = BacktestSpec {
            strategy_id: Some(7),
            parameters: overrides,
            ..Default::default()
        };

        let resolved = resolve_strategy(&source, &spec).await.unwrap();
        assert_eq!(resolved.kind, "sma_crossover");
        assert_eq!(resolved.params.get::<usize>("fast", 0).unwrap(), 5);
        assert_eq!(resolved.params.get::<usize>("slow", 0).unwrap(), 30);
    }

    #[tokio::test]
    async fn strategy_is_required() {
        let err = resolve_strategy(&source(), &BacktestSpec::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn request_body_shape() {
        let request: BatchBacktestRequest = serde_json::from_value(serde_json::json!({
            "crypto_ids": [1, 2],
            "strategy_type": "rsi",
            "parameters": { "period": "14" },
            "interval": "weekly",
            "config": { "initial_capital": 5000.0 }
        }))
        .unwrap();
        assert_eq!(request.crypto_ids, vec![1, 2]);
        assert_eq!(request.spec.interval, Interval::Weekly);
        assert_eq!(request.spec.config.initial_capital, 5000.0);
        assert_eq!(request.spec.config.fee_rate, BacktestConfig::default().fee_rate);
    }
}
