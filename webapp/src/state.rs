use shared::repo::{
    DashboardRepository, LoginAttemptRepository, PerformanceRepository, UserRepository, WeatherRepository,
    WidgetRepository,
};
use shared::Config;

use crate::session::SessionStore;
use crate::throttle::LoginThrottle;

pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub attempts: LoginAttemptRepository,
    pub widgets: WidgetRepository,
    pub dashboard: DashboardRepository,
    pub weather: WeatherRepository,
    pub performance: PerformanceRepository,
    pub sessions: SessionStore,
    pub throttle: LoginThrottle,
}
