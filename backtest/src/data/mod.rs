//! OHLCV candle data.

pub mod candle;

pub use candle::*;
