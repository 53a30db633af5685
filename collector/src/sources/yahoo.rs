use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use shared::PriceBar;
use tracing::debug;

use super::{decimal, http_client};

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance chart API client
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    /// Daily bars for `symbol` over `range` ("5d", "1mo", ...).
    pub async fn fetch_daily(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>> {
        let url = format!("{}/v8/finance/chart/{}?interval=1d&range={}", self.base_url, symbol, range);
        debug!("Fetching Yahoo data from: {}", url);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request")?
            .text()
            .await
            .context("Failed to read response")?;
        parse_chart(&body)
    }
}

pub fn parse_chart(body: &str) -> Result<Vec<PriceBar>> {
    let response: YahooResponse = serde_json::from_str(body).context("Failed to parse response")?;

    if let Some(error) = response.chart.error {
        bail!("Yahoo API error: {} - {}", error.code, error.description);
    }

    let result = response
        .chart
        .result
        .context("No data in response")?
        .into_iter()
        .next()
        .context("Empty result array")?;

    let quote = result.indicators.quote.into_iter().next().context("No quote data")?;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten().and_then(decimal);
        // Rows with gaps (holidays, halted sessions) are skipped.
        let (Some(open), Some(high), Some(low), Some(close)) =
            (field(&quote.open), field(&quote.high), field(&quote.low), field(&quote.close))
        else {
            continue;
        };
        let Some(time) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        bars.push(PriceBar {
            time,
            open,
            high,
            low,
            close,
            volume: field(&quote.volume).unwrap_or_default(),
        });
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_and_skips_gaps() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1709217000,1709303400,1709562600],
            "indicators":{"quote":[{
                "open":[179.55,null,176.15],
                "high":[180.53,null,176.90],
                "low":[177.38,null,173.79],
                "close":[180.75,null,175.10],
                "volume":[136682600,null,null]
            }]}
        }],"error":null}}"#;
        let bars = parse_chart(body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time.timestamp(), 1_709_217_000);
        assert_eq!(bars[0].close.to_string(), "180.75");
        assert_eq!(bars[0].volume.to_string(), "136682600");
        assert!(bars[1].volume.is_zero());
    }

    #[test]
    fn surfaces_api_errors() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }
}
