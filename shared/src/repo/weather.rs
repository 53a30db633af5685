use sqlx::PgPool;
use std::time::Duration;

use crate::error::Result;
use crate::models::{CurrentWeather, HistoricWeather, TimeRange};
use crate::timing::timed;

#[derive(Clone)]
pub struct WeatherRepository {
    pool: PgPool,
    slow_threshold: Duration,
}

impl WeatherRepository {
    pub fn new(pool: PgPool, slow_threshold: Duration) -> Self {
        Self { pool, slow_threshold }
    }

    /// Current conditions for one location, or for all of them.
    pub async fn current(&self, location: Option<&str>) -> Result<Vec<CurrentWeather>> {
        let query = sqlx::query_as::<_, CurrentWeather>(
            "SELECT location, temperature, humidity, wind_speed, weather_code, updated_at
             FROM current_weather_data
             WHERE ($1::text IS NULL OR lower(location) = lower($1))
             ORDER BY location",
        )
        .bind(location)
        .fetch_all(&self.pool);
        Ok(timed("weather.current", self.slow_threshold, query).await?)
    }

    pub async fn historic(&self, location: &str, range: &TimeRange) -> Result<Vec<HistoricWeather>> {
        range.validate()?;
        let query = sqlx::query_as::<_, HistoricWeather>(
            "SELECT location, time, temperature, humidity, precipitation, wind_speed FROM (
                SELECT location, time, temperature, humidity, precipitation, wind_speed
                FROM historic_weather_data
                WHERE lower(location) = lower($1)
                  AND ($2::timestamptz IS NULL OR time >= $2)
                  AND ($3::timestamptz IS NULL OR time <= $3)
                ORDER BY time DESC
                LIMIT $4
            ) w ORDER BY time ASC",
        )
        .bind(location)
        .bind(range.start)
        .bind(range.end)
        .bind(range.limit)
        .fetch_all(&self.pool);
        Ok(timed("weather.historic", self.slow_threshold, query).await?)
    }

    pub async fn upsert_current(&self, weather: &CurrentWeather) -> Result<()> {
        let query = sqlx::query(
            "INSERT INTO current_weather_data (location, temperature, humidity, wind_speed, weather_code, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (location) DO UPDATE SET
                temperature = EXCLUDED.temperature,
                humidity = EXCLUDED.humidity,
                wind_speed = EXCLUDED.wind_speed,
                weather_code = EXCLUDED.weather_code,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(&weather.location)
        .bind(weather.temperature)
        .bind(weather.humidity)
        .bind(weather.wind_speed)
        .bind(weather.weather_code)
        .bind(weather.updated_at)
        .execute(&self.pool);
        timed("weather.upsert_current", self.slow_threshold, query).await?;
        Ok(())
    }

    /// Appends an observation; re-inserting the same (location, time) is a no-op.
    pub async fn insert_historic(&self, row: &HistoricWeather) -> Result<bool> {
        let query = sqlx::query(
            "INSERT INTO historic_weather_data (location, time, temperature, humidity, precipitation, wind_speed)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (location, time) DO NOTHING",
        )
        .bind(&row.location)
        .bind(row.time)
        .bind(row.temperature)
        .bind(row.humidity)
        .bind(row.precipitation)
        .bind(row.wind_speed)
        .execute(&self.pool);
        let done = timed("weather.insert_historic", self.slow_threshold, query).await?;
        Ok(done.rows_affected() > 0)
    }
}
