//! Backtest errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BacktestError {
    #[error("not enough data: {0}")]
    NotEnoughData(String),
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("initial capital must be positive, got {0}")]
    InvalidCapital(f64),
}

impl BacktestError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
