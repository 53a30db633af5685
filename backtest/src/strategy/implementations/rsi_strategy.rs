//! RSI Strategy implementation

use crate::data::Candle;
use crate::error::BacktestError;
use crate::indicators::{Indicator, RSI};
use crate::strategy::{Signal, Strategy, StrategyParams};
use crate::Result;
use tracing::debug;

/// RSI Strategy configuration
#[derive(Debug, Clone)]
pub struct RSIStrategyConfig {
    /// RSI period
    pub rsi_period: usize,
    /// RSI oversold threshold (buy signal when RSI < this)
    pub rsi_oversold: f64,
    /// RSI overbought threshold (sell signal when RSI > this)
    pub rsi_overbought: f64,
}

impl Default for RSIStrategyConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

impl RSIStrategyConfig {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            rsi_period: params.positive_usize("period", defaults.rsi_period)?,
            rsi_oversold: params.get("oversold", defaults.rsi_oversold)?,
            rsi_overbought: params.get("overbought", defaults.rsi_overbought)?,
        };
        if !(0.0..=100.0).contains(&config.rsi_oversold) || !(0.0..=100.0).contains(&config.rsi_overbought) {
            return Err(BacktestError::invalid("oversold", "thresholds must be within 0..=100"));
        }
        if config.rsi_oversold >= config.rsi_overbought {
            return Err(BacktestError::invalid("oversold", "must be below overbought"));
        }
        Ok(config)
    }
}

/// RSI-based trading strategy: buy oversold, sell overbought
pub struct RSIStrategy {
    config: RSIStrategyConfig,
    rsi: RSI,
}

impl RSIStrategy {
    /// Create new RSI strategy
    pub fn new(config: RSIStrategyConfig) -> Result<Self> {
        Ok(Self {
            rsi: RSI::new(config.rsi_period)?,
            config,
        })
    }
}

impl Strategy for RSIStrategy {
    fn name(&self) -> &str {
        "rsi"
    }

    fn warmup_candles(&self) -> usize {
        self.config.rsi_period + 1
    }

    fn process(&mut self, candle: &Candle) -> Result<Signal> {
        self.rsi.update(candle.close);

        let Some(rsi_value) = self.rsi.value() else {
            return Ok(Signal::hold("RSI indicator not ready".to_string()));
        };

        debug!(
            "RSI value: {:.2}, oversold: {}, overbought: {}",
            rsi_value, self.config.rsi_oversold, self.config.rsi_overbought
        );

        if rsi_value < self.config.rsi_oversold {
            Ok(Signal::buy(
                candle.close,
                format!("RSI oversold: {:.2} < {}", rsi_value, self.config.rsi_oversold),
            ))
        } else if rsi_value > self.config.rsi_overbought {
            Ok(Signal::sell(
                candle.close,
                format!("RSI overbought: {:.2} > {}", rsi_value, self.config.rsi_overbought),
            ))
        } else {
            Ok(Signal::hold(format!("RSI in neutral zone: {:.2}", rsi_value)))
        }
    }

    fn is_ready(&self) -> bool {
        self.rsi.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SignalType;
    use chrono::Utc;

    fn candle(close: f64, minute: i64) -> Candle {
        Candle::new(
            close,
            close + 1.0,
            close - 1.0,
            close,
            1000.0,
            Utc::now() + chrono::Duration::minutes(minute),
            "BTC".to_string(),
            "raw".to_string(),
        )
    }

    #[test]
    fn falling_prices_trigger_buy() {
        let mut strategy = RSIStrategy::new(RSIStrategyConfig::default()).unwrap();
        let mut last = Signal::hold(String::new());
        for i in 0..30 {
            last = strategy.process(&candle(100.0 - i as f64, i)).unwrap();
        }
        assert!(strategy.is_ready());
        assert_eq!(last.signal_type, SignalType::Buy);
    }

    #[test]
    fn rising_prices_trigger_sell() {
        let mut strategy = RSIStrategy::new(RSIStrategyConfig::default()).unwrap();
        let mut last = Signal::hold(String::new());
        for i in 0..30 {
            last = strategy.process(&candle(100.0 + i as f64, i)).unwrap();
        }
        assert_eq!(last.signal_type, SignalType::Sell);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut params = StrategyParams::default();
        params.set("oversold", "80");
        params.set("overbought", "20");
        assert!(RSIStrategyConfig::from_params(&params).is_err());
    }
}
