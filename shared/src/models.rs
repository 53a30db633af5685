use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cryptocurrency {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub coingecko_id: Option<String>,
}

/// One OHLCV row, either raw or a continuous-aggregate bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PriceBar {
    pub time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CryptoStrategy {
    pub id: i32,
    pub name: String,
    pub strategy_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StrategyParameter {
    pub param_name: String,
    pub param_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyWithParameters {
    #[serde(flatten)]
    pub strategy: CryptoStrategy,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stock {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoricWeather {
    pub location: String,
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CurrentWeather {
    pub location: String,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather_code: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DashboardRow {
    pub crypto_id: i32,
    pub symbol: String,
    pub name: String,
    pub last_close: Option<Decimal>,
    pub high_30d: Option<Decimal>,
    pub low_30d: Option<Decimal>,
    pub volume_30d: Option<Decimal>,
    pub as_of: Option<DateTime<Utc>>,
}

/// Optional time window used by the range queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl TimeRange {
    pub fn validate(&self) -> crate::Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(crate::Error::Validation("start must not be after end".to_string()));
            }
        }
        if let Some(limit) = self.limit {
            if limit <= 0 {
                return Err(crate::Error::Validation("limit must be positive".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_range_validation() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let range = TimeRange { start: Some(start), end: Some(end), limit: None };
        assert!(range.validate().is_err());

        let range = TimeRange { start: Some(end), end: Some(start), limit: Some(10) };
        assert!(range.validate().is_ok());

        let range = TimeRange { limit: Some(0), ..Default::default() };
        assert!(range.validate().is_err());
    }
}
