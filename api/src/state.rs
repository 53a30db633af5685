use shared::repo::{CryptoRepository, DashboardRepository, PerformanceRepository, StockRepository, WeatherRepository};
use shared::{Cache, Config, DbPool};

pub struct AppState {
    pub config: Config,
    pub cache: Cache,
    pub crypto: CryptoRepository,
    pub stocks: StockRepository,
    pub weather: WeatherRepository,
    pub dashboard: DashboardRepository,
    pub performance: PerformanceRepository,
}

impl AppState {
    pub fn new(config: Config, pool: DbPool, cache: Cache) -> Self {
        let slow = config.slow_query_threshold;
        AppState {
            crypto: CryptoRepository::new(pool.clone(), slow),
            stocks: StockRepository::new(pool.clone(), slow),
            weather: WeatherRepository::new(pool.clone(), slow),
            dashboard: DashboardRepository::new(pool.clone(), slow),
            performance: PerformanceRepository::new(pool, slow),
            cache,
            config,
        }
    }
}
