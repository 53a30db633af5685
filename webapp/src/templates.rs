use askama::Template;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::repo::performance::{DatabaseHealth, SlowQuery, TableStats};
use shared::{CurrentWeather, DashboardRow};

use crate::widgets::WidgetView;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub cards: Vec<SummaryCard>,
    pub weather: Vec<WeatherCard>,
    pub widgets: Vec<WidgetView>,
}

#[derive(Template)]
#[template(path = "performance.html")]
pub struct PerformanceTemplate {
    pub username: String,
    pub health: Option<HealthView>,
    pub health_error: Option<String>,
    pub tables: Vec<TableStats>,
    pub slow_queries_available: bool,
    pub slow_queries: Vec<SlowQuery>,
    pub threshold_ms: f64,
}

impl PerformanceTemplate {
    pub fn size(&self, bytes: &i64) -> String {
        human_bytes(*bytes)
    }

    pub fn when(&self, value: &Option<DateTime<Utc>>) -> String {
        timestamp(*value)
    }
}

pub struct SummaryCard {
    pub symbol: String,
    pub name: String,
    pub last_close: String,
    pub high_30d: String,
    pub low_30d: String,
    pub volume_30d: String,
    pub as_of: String,
}

pub struct WeatherCard {
    pub location: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
    pub updated_at: String,
}

pub struct HealthView {
    pub status: String,
    pub server_version: String,
    pub timescaledb_version: String,
    pub database_size: String,
    pub connections: String,
    pub cache_hit_ratio: String,
    pub ping_ms: String,
}

fn decimal(value: Option<Decimal>) -> String {
    value.map(|v| v.round_dp(2).to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn float(value: Option<f64>, unit: &str) -> String {
    value.map(|v| format!("{:.1}{}", v, unit)).unwrap_or_else(|| "n/a".to_string())
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn human_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

impl From<DashboardRow> for SummaryCard {
    fn from(row: DashboardRow) -> Self {
        SummaryCard {
            symbol: row.symbol,
            name: row.name,
            last_close: decimal(row.last_close),
            high_30d: decimal(row.high_30d),
            low_30d: decimal(row.low_30d),
            volume_30d: decimal(row.volume_30d),
            as_of: timestamp(row.as_of),
        }
    }
}

impl From<CurrentWeather> for WeatherCard {
    fn from(row: CurrentWeather) -> Self {
        WeatherCard {
            location: row.location,
            temperature: float(Some(row.temperature), " °C"),
            humidity: float(row.humidity, " %"),
            wind_speed: float(row.wind_speed, " km/h"),
            updated_at: timestamp(Some(row.updated_at)),
        }
    }
}

impl From<DatabaseHealth> for HealthView {
    fn from(health: DatabaseHealth) -> Self {
        HealthView {
            status: format!("{:?}", health.status).to_lowercase(),
            server_version: health.server_version,
            timescaledb_version: health.timescaledb_version.unwrap_or_else(|| "not installed".to_string()),
            database_size: human_bytes(health.database_size_bytes),
            connections: format!("{} / {}", health.total_connections, health.max_connections),
            cache_hit_ratio: format!("{:.2}%", health.cache_hit_ratio * 100.0),
            ping_ms: format!("{:.1} ms", health.ping_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn formats_sizes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KB");
        assert_eq!(human_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn formats_missing_values() {
        assert_eq!(decimal(None), "n/a");
        assert_eq!(decimal(Some(Decimal::from_str("42123.456").unwrap())), "42123.46");
        assert_eq!(float(Some(3.14159), " °C"), "3.1 °C");
    }

    #[test]
    fn login_page_shows_error() {
        let page = LoginTemplate {
            error: Some("Too many failed login attempts. Please try again later.".to_string()),
            username: "alice".to_string(),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Too many failed login attempts"));
        assert!(html.contains("value=\"alice\""));
    }

    #[test]
    fn performance_page_lists_tables() {
        let vacuumed = Utc.with_ymd_and_hms(2024, 3, 1, 4, 30, 0).unwrap();
        let page = PerformanceTemplate {
            username: "alice".to_string(),
            health: None,
            health_error: Some("pool timed out".to_string()),
            tables: vec![TableStats {
                table_name: "crypto_prices".to_string(),
                n_live_tup: 900,
                n_dead_tup: 100,
                dead_ratio: 0.1,
                total_bytes: 3 * 1024 * 1024,
                seq_scan: 4,
                idx_scan: 250,
                last_vacuum: None,
                last_autovacuum: Some(vacuumed),
                last_analyze: None,
                last_autoanalyze: None,
            }],
            slow_queries_available: false,
            slow_queries: Vec::new(),
            threshold_ms: 1000.0,
        };
        let html = page.render().unwrap();
        assert!(html.contains("crypto_prices"));
        assert!(html.contains("3.0 MB"));
        assert!(html.contains("2024-03-01 04:30 UTC"));
        assert!(html.contains("10.0"));
        assert!(html.contains("Health check failed: pool timed out"));
        assert!(html.contains("pg_stat_statements is not installed."));
    }
}
