use sqlx::PgPool;
use std::collections::BTreeMap;
use std::time::Duration;

use super::ohlcv::{select_bars, upsert_bars, OhlcvTable};
use crate::error::{Error, Result};
use crate::models::{
    CryptoStrategy, Cryptocurrency, PriceBar, StrategyParameter, StrategyWithParameters, TimeRange,
};
use crate::timing::timed;

const RAW: OhlcvTable = OhlcvTable {
    table: "crypto_prices",
    id_column: "crypto_id",
    time_column: "time",
};
const DAILY: OhlcvTable = OhlcvTable {
    table: "crypto_prices_daily",
    id_column: "crypto_id",
    time_column: "bucket",
};
const WEEKLY: OhlcvTable = OhlcvTable {
    table: "crypto_prices_weekly",
    id_column: "crypto_id",
    time_column: "bucket",
};

/// Bar granularity a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Raw,
    #[default]
    Daily,
    Weekly,
}

#[derive(Clone)]
pub struct CryptoRepository {
    pool: PgPool,
    slow_threshold: Duration,
}

impl CryptoRepository {
    pub fn new(pool: PgPool, slow_threshold: Duration) -> Self {
        Self { pool, slow_threshold }
    }

    pub async fn list_cryptocurrencies(&self) -> Result<Vec<Cryptocurrency>> {
        let query = sqlx::query_as::<_, Cryptocurrency>(
            "SELECT id, symbol, name, coingecko_id FROM cryptocurrencies ORDER BY symbol",
        )
        .fetch_all(&self.pool);
        Ok(timed("crypto.list", self.slow_threshold, query).await?)
    }

    pub async fn find_cryptocurrency(&self, id: i32) -> Result<Cryptocurrency> {
        let query = sqlx::query_as::<_, Cryptocurrency>(
            "SELECT id, symbol, name, coingecko_id FROM cryptocurrencies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool);
        timed("crypto.find", self.slow_threshold, query)
            .await?
            .ok_or_else(|| Error::NotFound(format!("cryptocurrency {}", id)))
    }

    pub async fn find_cryptocurrency_by_symbol(&self, symbol: &str) -> Result<Cryptocurrency> {
        let query = sqlx::query_as::<_, Cryptocurrency>(
            "SELECT id, symbol, name, coingecko_id FROM cryptocurrencies WHERE upper(symbol) = upper($1)",
        )
        .bind(symbol)
        .fetch_optional(&self.pool);
        timed("crypto.find_by_symbol", self.slow_threshold, query)
            .await?
            .ok_or_else(|| Error::NotFound(format!("cryptocurrency {}", symbol)))
    }

    pub async fn bars(&self, crypto_id: i32, interval: Interval, range: &TimeRange) -> Result<Vec<PriceBar>> {
        range.validate()?;
        let (source, name) = match interval {
            Interval::Raw => (&RAW, "crypto.prices"),
            Interval::Daily => (&DAILY, "crypto.daily"),
            Interval::Weekly => (&WEEKLY, "crypto.weekly"),
        };
        timed(name, self.slow_threshold, select_bars(&self.pool, source, crypto_id, range)).await
    }

    pub async fn upsert_prices(&self, crypto_id: i32, bars: &[PriceBar]) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }
        timed("crypto.upsert", self.slow_threshold, upsert_bars(&self.pool, &RAW, crypto_id, bars)).await
    }

    pub async fn list_strategies(&self) -> Result<Vec<StrategyWithParameters>> {
        let strategies = timed(
            "crypto.strategies",
            self.slow_threshold,
            sqlx::query_as::<_, CryptoStrategy>(
                "SELECT id, name, strategy_type, description FROM crypto_strategies ORDER BY name",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        let rows: Vec<(i32, String, String)> = timed(
            "crypto.strategy_parameters",
            self.slow_threshold,
            sqlx::query_as(
                "SELECT strategy_id, param_name, param_value FROM crypto_strategy_parameters",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        let mut by_strategy: BTreeMap<i32, BTreeMap<String, String>> = BTreeMap::new();
        for (strategy_id, name, value) in rows {
            by_strategy.entry(strategy_id).or_default().insert(name, value);
        }

        Ok(strategies
            .into_iter()
            .map(|strategy| StrategyWithParameters {
                parameters: by_strategy.remove(&strategy.id).unwrap_or_default(),
                strategy,
            })
            .collect())
    }

    pub async fn find_strategy(&self, id: i32) -> Result<StrategyWithParameters> {
        let strategy = timed(
            "crypto.strategy",
            self.slow_threshold,
            sqlx::query_as::<_, CryptoStrategy>(
                "SELECT id, name, strategy_type, description FROM crypto_strategies WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("strategy {}", id)))?;

        let parameters = sqlx::query_as::<_, StrategyParameter>(
            "SELECT param_name, param_value FROM crypto_strategy_parameters WHERE strategy_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|p| (p.param_name, p.param_value))
        .collect();

        Ok(StrategyWithParameters { strategy, parameters })
    }
}
