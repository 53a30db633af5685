//! OHLCV candle data structures

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// OHLCV candle data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Symbol (e.g., "BTC")
    pub symbol: String,
    /// Timeframe (e.g., "raw", "daily", "weekly")
    pub timeframe: String,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
        symbol: String,
        timeframe: String,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
            symbol,
            timeframe,
        }
    }
}

/// Collection of candles
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new() -> Self {
        Self {
            candles: Vec::new(),
        }
    }

    /// Create from vector of candles, ordered oldest first
    pub fn from_vec(candles: Vec<Candle>) -> Self {
        let mut series = Self { candles };
        series.sort_by_time();
        series
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get first candle
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Sort by timestamp (oldest first), keeping the last candle of any duplicated timestamp
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(self.candles.len());
        for candle in self.candles.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }
        self.candles = deduped;
    }

    /// Close-to-close return over the whole series, in percent
    pub fn price_change_percent(&self) -> Option<f64> {
        let first = self.first()?.close;
        let last = self.last()?.close;
        if first == 0.0 {
            return None;
        }
        Some((last / first - 1.0) * 100.0)
    }
}

impl Default for CandleSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_vec(candles)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle_at(hour: u32, close: f64) -> Candle {
        Candle::new(
            close,
            close + 1.0,
            close - 1.0,
            close,
            10.0,
            Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            "BTC".to_string(),
            "raw".to_string(),
        )
    }

    #[test]
    fn from_vec_orders_and_dedupes() {
        let series = CandleSeries::from_vec(vec![candle_at(3, 30.0), candle_at(1, 10.0), candle_at(3, 31.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 31.0]);
    }

    #[test]
    fn price_change() {
        let series = CandleSeries::from_vec(vec![candle_at(1, 100.0), candle_at(2, 110.0)]);
        let change = series.price_change_percent().unwrap();
        assert!((change - 10.0).abs() < 1e-9);
        assert!(CandleSeries::new().price_change_percent().is_none());
    }
}
