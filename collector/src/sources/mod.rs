//! HTTP clients for the upstream market and weather APIs.

use anyhow::{Context, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

pub mod coingecko;
pub mod open_meteo;
pub mod yahoo;

pub use coingecko::CoinGeckoClient;
pub use open_meteo::OpenMeteoClient;
pub use yahoo::YahooClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (compatible; dashboard-collector)")
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// `None` for NaN and infinities.
pub(crate) fn decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}
