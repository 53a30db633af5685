//! Strategy backtesting for the dashboard's price series.
//!
//! - **Data**: OHLCV candles and ordered candle series
//! - **Indicators**: SMA, EMA, RSI, MACD, Bollinger Bands (wrapping `ta`)
//! - **Strategies**: signal generators built from name + string parameters
//! - **Backtesting**: long-only simulation with a running equity curve and metrics
//!
//! # Example
//!
//! ```
//! use backtest::prelude::*;
//!
//! let params = StrategyParams::default();
//! let mut strategy = build_strategy("buy_and_hold", &params).unwrap();
//! let series = CandleSeries::new();
//! let engine = BacktestEngine::new(BacktestConfig::default());
//! assert!(engine.run(strategy.as_mut(), &series).is_err());
//! ```

pub mod backtest;
pub mod data;
pub mod error;
pub mod indicators;
pub mod strategy;

pub mod prelude {
    pub use crate::backtest::*;
    pub use crate::data::*;
    pub use crate::error::BacktestError;
    pub use crate::indicators::*;
    pub use crate::strategy::*;
}

pub use error::BacktestError;

/// Result type alias
pub type Result<T> = std::result::Result<T, BacktestError>;
