//! Moving average crossover strategy

use crate::data::Candle;
use crate::error::BacktestError;
use crate::indicators::{Indicator, SMA};
use crate::strategy::{detect_crossover, Crossover, Signal, Strategy, StrategyParams};
use crate::Result;

#[derive(Debug, Clone)]
pub struct SmaCrossoverConfig {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
        }
    }
}

impl SmaCrossoverConfig {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fast_period: params.positive_usize("fast", defaults.fast_period)?,
            slow_period: params.positive_usize("slow", defaults.slow_period)?,
        })
    }
}

/// Buys when the fast SMA crosses above the slow one, sells on the opposite cross.
pub struct SmaCrossoverStrategy {
    config: SmaCrossoverConfig,
    fast: SMA,
    slow: SMA,
    last_spread: Option<f64>,
}

impl SmaCrossoverStrategy {
    pub fn new(config: SmaCrossoverConfig) -> Result<Self> {
        if config.fast_period >= config.slow_period {
            return Err(BacktestError::invalid("fast", "must be smaller than slow"));
        }
        Ok(Self {
            fast: SMA::new(config.fast_period)?,
            slow: SMA::new(config.slow_period)?,
            config,
            last_spread: None,
        })
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn warmup_candles(&self) -> usize {
        self.config.slow_period
    }

    fn process(&mut self, candle: &Candle) -> Result<Signal> {
        self.fast.update(candle.close);
        self.slow.update(candle.close);

        let (Some(fast), Some(slow)) = (self.fast.value(), self.slow.value()) else {
            return Ok(Signal::hold("moving averages not ready".to_string()));
        };

        let spread = fast - slow;
        let crossover = detect_crossover(self.last_spread, spread);
        self.last_spread = Some(spread);

        Ok(match crossover {
            Some(Crossover::Bullish) => Signal::buy(
                candle.close,
                format!("SMA{} crossed above SMA{}", self.config.fast_period, self.config.slow_period),
            ),
            Some(Crossover::Bearish) => Signal::sell(
                candle.close,
                format!("SMA{} crossed below SMA{}", self.config.fast_period, self.config.slow_period),
            ),
            None => Signal::hold(format!("spread {:.4}", spread)),
        })
    }

    fn is_ready(&self) -> bool {
        self.slow.is_ready()
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
            close,
            close,
            close,
            1.0,
            Utc::now() + chrono::Duration::minutes(minute),
            "ETH".to_string(),
            "daily".to_string(),
        )
    }

    #[test]
    fn v_shape_buys_after_the_bottom() {
        let mut strategy = SmaCrossoverStrategy::new(SmaCrossoverConfig {
            fast_period: 2,
            slow_period: 4,
        })
        .unwrap();
        let prices = [10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 11.0];
        let signals: Vec<SignalType> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| strategy.process(&candle(*p, i as i64)).unwrap().signal_type)
            .collect();
        // SMA4 ready at index 3; spreads -1.0, -1.0, -0.5, then +0.75 at index 6
        assert_eq!(signals[6], SignalType::Buy);
        assert!(!signals.contains(&SignalType::Sell));
    }

    #[test]
    fn fast_must_be_below_slow() {
        let config = SmaCrossoverConfig {
            fast_period: 30,
            slow_period: 10,
        };
        assert!(SmaCrossoverStrategy::new(config).is_err());
    }
}
