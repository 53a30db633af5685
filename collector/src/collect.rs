use anyhow::Result;
use shared::repo::{CryptoRepository, DashboardRepository, StockRepository, WeatherRepository};
use shared::{Cache, Config, WeatherLocation};
use tracing::{error, info, warn};

use crate::sources::{CoinGeckoClient, OpenMeteoClient, YahooClient};

/// Days of OHLC requested from CoinGecko per cycle (30-minute candles).
const CRYPTO_DAYS: u32 = 1;
/// Range of daily bars requested from Yahoo per cycle.
const STOCK_RANGE: &str = "5d";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub crypto_bars: u64,
    pub stock_bars: u64,
    pub weather_readings: u64,
    pub failures: u64,
}

pub struct Collector {
    crypto: CryptoRepository,
    stocks: StockRepository,
    weather: WeatherRepository,
    dashboard: DashboardRepository,
    cache: Cache,
    coingecko: CoinGeckoClient,
    yahoo: YahooClient,
    open_meteo: OpenMeteoClient,
    locations: Vec<WeatherLocation>,
}

impl Collector {
    pub fn new(config: &Config, pool: shared::DbPool, cache: Cache) -> Result<Self> {
        let slow = config.slow_query_threshold;
        Ok(Self {
            crypto: CryptoRepository::new(pool.clone(), slow),
            stocks: StockRepository::new(pool.clone(), slow),
            weather: WeatherRepository::new(pool.clone(), slow),
            dashboard: DashboardRepository::new(pool, slow),
            cache,
            coingecko: CoinGeckoClient::new(&config.coingecko_base_url)?,
            yahoo: YahooClient::new(&config.stock_api_base_url)?,
            open_meteo: OpenMeteoClient::new(&config.open_meteo_base_url)?,
            locations: config.weather_locations.clone(),
        })
    }

    /// One pass over every source. A failing item is logged and counted, never fatal.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        self.collect_crypto(&mut report).await;
        self.collect_stocks(&mut report).await;
        self.collect_weather(&mut report).await;
        info!(
            crypto_bars = report.crypto_bars,
            stock_bars = report.stock_bars,
            weather_readings = report.weather_readings,
            failures = report.failures,
            "Collection cycle finished"
        );
        report
    }

    async fn collect_crypto(&self, report: &mut CycleReport) {
        let cryptos = match self.crypto.list_cryptocurrencies().await {
            Ok(cryptos) => cryptos,
            Err(e) => {
                error!("Failed to list cryptocurrencies: {}", e);
                report.failures += 1;
                return;
            }
        };
        for crypto in cryptos {
            let Some(coin_id) = crypto.coingecko_id.as_deref() else {
                continue;
            };
            let written = match self.coingecko.fetch_ohlc(coin_id, CRYPTO_DAYS).await {
                Ok(bars) => self.crypto.upsert_prices(crypto.id, &bars).await.map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            match written {
                Ok(n) => report.crypto_bars += n,
                Err(e) => {
                    warn!(symbol = %crypto.symbol, "Crypto collection failed: {:#}", e);
                    report.failures += 1;
                }
            }
        }
    }

    async fn collect_stocks(&self, report: &mut CycleReport) {
        let stocks = match self.stocks.list_stocks().await {
            Ok(stocks) => stocks,
            Err(e) => {
                error!("Failed to list stocks: {}", e);
                report.failures += 1;
                return;
            }
        };
        for stock in stocks {
            let written = match self.yahoo.fetch_daily(&stock.symbol, STOCK_RANGE).await {
                Ok(bars) => self.stocks.upsert_prices(stock.id, &bars).await.map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            match written {
                Ok(n) => report.stock_bars += n,
                Err(e) => {
                    warn!(symbol = %stock.symbol, "Stock collection failed: {:#}", e);
                    report.failures += 1;
                }
            }
        }
    }

    async fn collect_weather(&self, report: &mut CycleReport) {
        for location in &self.locations {
            match self.store_weather(location).await {
                Ok(()) => report.weather_readings += 1,
                Err(e) => {
                    warn!(location = %location.name, "Weather collection failed: {:#}", e);
                    report.failures += 1;
                }
            }
        }
    }

    async fn store_weather(&self, location: &WeatherLocation) -> Result<()> {
        let observation = self.open_meteo.fetch_current(location).await?;
        self.weather.upsert_current(&observation.current(&location.name)).await?;
        // Open-Meteo repeats the reading until its next update; the insert is idempotent.
        self.weather.insert_historic(&observation.historic(&location.name)).await?;
        Ok(())
    }

    /// Nightly rebuild of `dashboard_summary`; the API's cached copies are dropped with it.
    pub async fn refresh_dashboard(&self) {
        if let Err(e) = self.dashboard.refresh_and_invalidate(&self.cache).await {
            error!("Dashboard refresh failed: {}", e);
        }
    }
}
