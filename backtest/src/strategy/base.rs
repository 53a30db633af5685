//! Base strategy trait and trading signals

use crate::data::Candle;
use crate::Result;

/// Base trait for all trading strategies
pub trait Strategy: Send {
    /// Get strategy name
    fn name(&self) -> &str;

    /// Number of candles consumed before the first actionable signal
    fn warmup_candles(&self) -> usize;

    /// Process new candle and generate signal
    fn process(&mut self, candle: &Candle) -> Result<Signal>;

    /// Check if strategy is ready (has enough data)
    fn is_ready(&self) -> bool;
}

/// Signal type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Open a long position
    Buy,
    /// Close the long position
    Sell,
    /// No action
    Hold,
}

/// Trading signal
#[derive(Debug, Clone)]
pub struct Signal {
    /// Signal type
    pub signal_type: SignalType,
    /// Price the signal was generated at
    pub price: Option<f64>,
    /// Reason for signal
    pub reason: String,
}

impl Signal {
    /// Create buy signal
    pub fn buy(price: f64, reason: String) -> Self {
        Self {
            signal_type: SignalType::Buy,
            price: Some(price),
            reason,
        }
    }

    /// Create sell signal
    pub fn sell(price: f64, reason: String) -> Self {
        Self {
            signal_type: SignalType::Sell,
            price: Some(price),
            reason,
        }
    }

    /// Create hold signal
    pub fn hold(reason: String) -> Self {
        Self {
            signal_type: SignalType::Hold,
            price: None,
            reason,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.signal_type == SignalType::Hold
    }
}

/// Direction of a line crossing another between two consecutive candles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Bullish,
    Bearish,
}

/// Detects a sign change of `current` relative to `previous` (both are spreads, e.g. fast - slow).
pub fn detect_crossover(previous: Option<f64>, current: f64) -> Option<Crossover> {
    let prev = previous?;
    if prev <= 0.0 && current > 0.0 {
        Some(Crossover::Bullish)
    } else if prev >= 0.0 && current < 0.0 {
        Some(Crossover::Bearish)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_detection() {
        assert_eq!(detect_crossover(Some(-0.5), 1.0), Some(Crossover::Bullish));
        assert_eq!(detect_crossover(Some(0.5), -1.0), Some(Crossover::Bearish));
        assert_eq!(detect_crossover(Some(0.5), 1.0), None);
        assert_eq!(detect_crossover(None, 1.0), None);
    }
}
