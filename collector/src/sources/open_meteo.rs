use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use shared::{CurrentWeather, HistoricWeather, WeatherLocation};
use tracing::debug;

use super::http_client;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: Option<i32>,
}

/// One reading at a location, written both as the latest value and as history.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather_code: Option<i32>,
}

impl WeatherObservation {
    pub fn current(&self, location: &str) -> CurrentWeather {
        CurrentWeather {
            location: location.to_string(),
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            weather_code: self.weather_code,
            updated_at: self.time,
        }
    }

    pub fn historic(&self, location: &str) -> HistoricWeather {
        HistoricWeather {
            location: location.to_string(),
            time: self.time,
            temperature: self.temperature,
            humidity: self.humidity,
            precipitation: self.precipitation,
            wind_speed: self.wind_speed,
        }
    }
}

pub struct OpenMeteoClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    pub async fn fetch_current(&self, location: &WeatherLocation) -> Result<WeatherObservation> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current={}&timezone=GMT",
            self.base_url, location.latitude, location.longitude, CURRENT_FIELDS
        );
        debug!("Fetching Open-Meteo data from: {}", url);

        let response = self.client.get(&url).send().await.context("Failed to send request")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Open-Meteo returned {} for {}", status, location.name);
        }
        let body = response.text().await.context("Failed to read response")?;
        parse_current(&body)
    }
}

pub fn parse_current(body: &str) -> Result<WeatherObservation> {
    let response: ForecastResponse = serde_json::from_str(body).context("Failed to parse response")?;
    let current = response.current;

    // Times are ISO 8601 without seconds or offset, in the requested GMT zone.
    let time = NaiveDateTime::parse_from_str(&current.time, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("bad observation time {:?}", current.time))?
        .and_utc();
    let temperature = current.temperature_2m.context("observation without temperature")?;

    Ok(WeatherObservation {
        time,
        temperature,
        humidity: current.relative_humidity_2m,
        precipitation: current.precipitation,
        wind_speed: current.wind_speed_10m,
        weather_code: current.weather_code,
    })
}
