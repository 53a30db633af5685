//! Strategy implementations

pub mod bollinger;
pub mod buy_and_hold;
pub mod macd_strategy;
pub mod rsi_strategy;
pub mod sma_crossover;

pub use bollinger::*;
pub use buy_and_hold::*;
pub use macd_strategy::*;
pub use rsi_strategy::*;
pub use sma_crossover::*;
