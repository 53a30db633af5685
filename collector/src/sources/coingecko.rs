use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use shared::PriceBar;
use tracing::debug;

use super::{decimal, http_client};

/// CoinGecko OHLC endpoint. Candles carry no volume; it is stored as zero.
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    pub async fn fetch_ohlc(&self, coin_id: &str, days: u32) -> Result<Vec<PriceBar>> {
        let url = format!("{}/coins/{}/ohlc?vs_currency=usd&days={}", self.base_url, coin_id, days);
        debug!("Fetching CoinGecko data from: {}", url);

        let response = self.client.get(&url).send().await.context("Failed to send request")?;
        let status = response.status();
        if !status.is_success() {
            bail!("CoinGecko returned {} for {}", status, coin_id);
        }
        let rows: Vec<Vec<f64>> = response.json().await.context("Failed to parse response")?;
        parse_ohlc(&rows)
    }
}

/// Rows are `[timestamp_ms, open, high, low, close]`.
pub fn parse_ohlc(rows: &[Vec<f64>]) -> Result<Vec<PriceBar>> {
    let zero = rust_decimal::Decimal::ZERO;
    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        let [ts, open, high, low, close] = row.as_slice() else {
            bail!("unexpected OHLC row width {}", row.len());
        };
        let time = Utc
            .timestamp_millis_opt(*ts as i64)
            .single()
            .with_context(|| format!("bad timestamp {}", ts))?;
        let (Some(open), Some(high), Some(low), Some(close)) =
            (decimal(*open), decimal(*high), decimal(*low), decimal(*close))
        else {
            continue;
        };
        bars.push(PriceBar {
            time,
            open,
            high,
            low,
            close,
            volume: zero,
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ohlc_rows() {
        let rows: Vec<Vec<f64>> = serde_json::from_str(
            "[[1709251200000, 61000.5, 61500.0, 60800.25, 61234.0],
              [1709253000000, 61234.0, 61300.0, 61100.0, 61111.0]]",
        )
        .unwrap();
        let bars = parse_ohlc(&rows).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time.timestamp(), 1_709_251_200);
        assert_eq!(bars[0].low.to_string(), "60800.25");
        assert!(bars[1].volume.is_zero());
    }

    #[test]
    fn rejects_short_rows() {
        let rows = vec![vec![1709251200000.0, 1.0, 2.0]];
        assert!(parse_ohlc(&rows).is_err());
    }
}
