mod ohlcv;

pub mod crypto;
pub mod dashboard;
pub mod performance;
pub mod stocks;
pub mod users;
pub mod weather;

pub use crypto::{CryptoRepository, Interval};
pub use dashboard::DashboardRepository;
pub use performance::PerformanceRepository;
pub use stocks::StockRepository;
pub use users::{LoginAttemptRepository, UserRepository, WidgetRepository};
pub use weather::WeatherRepository;
