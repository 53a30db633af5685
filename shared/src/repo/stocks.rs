use sqlx::PgPool;
use std::time::Duration;

use super::ohlcv::{select_bars, upsert_bars, OhlcvTable};
use crate::error::{Error, Result};
use crate::models::{PriceBar, Stock, TimeRange};
use crate::timing::timed;

const PRICES: OhlcvTable = OhlcvTable {
    table: "stock_prices",
    id_column: "stock_id",
    time_column: "time",
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
    slow_threshold: Duration,
}

impl StockRepository {
    pub fn new(pool: PgPool, slow_threshold: Duration) -> Self {
        Self { pool, slow_threshold }
    }

    pub async fn list_stocks(&self) -> Result<Vec<Stock>> {
        let query = sqlx::query_as::<_, Stock>("SELECT id, symbol, name, exchange FROM stocks ORDER BY symbol")
            .fetch_all(&self.pool);
        Ok(timed("stocks.list", self.slow_threshold, query).await?)
    }

    pub async fn find_stock_by_symbol(&self, symbol: &str) -> Result<Stock> {
        let query = sqlx::query_as::<_, Stock>(
            "SELECT id, symbol, name, exchange FROM stocks WHERE upper(symbol) = upper($1)",
        )
        .bind(symbol)
        .fetch_optional(&self.pool);
        timed("stocks.find_by_symbol", self.slow_threshold, query)
            .await?
            .ok_or_else(|| Error::NotFound(format!("stock {}", symbol)))
    }

    pub async fn prices(&self, stock_id: i32, range: &TimeRange) -> Result<Vec<PriceBar>> {
        range.validate()?;
        timed("stocks.prices", self.slow_threshold, select_bars(&self.pool, &PRICES, stock_id, range)).await
    }

    pub async fn upsert_prices(&self, stock_id: i32, bars: &[PriceBar]) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }
        timed("stocks.upsert", self.slow_threshold, upsert_bars(&self.pool, &PRICES, stock_id, bars)).await
    }
}
