//! MACD Strategy implementation

use crate::data::Candle;
use crate::indicators::{Indicator, MACD};
use crate::strategy::{detect_crossover, Crossover, Signal, Strategy, StrategyParams};
use crate::Result;
use tracing::debug;

/// MACD Strategy configuration
#[derive(Debug, Clone)]
pub struct MACDStrategyConfig {
    /// MACD fast period
    pub fast_period: usize,
    /// MACD slow period
    pub slow_period: usize,
    /// MACD signal period
    pub signal_period: usize,
    /// Minimum absolute histogram value for a crossover to count
    pub min_histogram: f64,
}

impl Default for MACDStrategyConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            min_histogram: 0.0,
        }
    }
}

impl MACDStrategyConfig {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fast_period: params.positive_usize("fast", defaults.fast_period)?,
            slow_period: params.positive_usize("slow", defaults.slow_period)?,
            signal_period: params.positive_usize("signal", defaults.signal_period)?,
            min_histogram: params.get("min_histogram", defaults.min_histogram)?,
        })
    }
}

/// MACD-based trading strategy: trade histogram sign changes
pub struct MACDStrategy {
    config: MACDStrategyConfig,
    macd: MACD,
    last_histogram: Option<f64>,
}

impl MACDStrategy {
    /// Create new MACD strategy
    pub fn new(config: MACDStrategyConfig) -> Result<Self> {
        Ok(Self {
            macd: MACD::new(config.fast_period, config.slow_period, config.signal_period)?,
            config,
            last_histogram: None,
        })
    }
}

impl Strategy for MACDStrategy {
    fn name(&self) -> &str {
        "macd"
    }

    fn warmup_candles(&self) -> usize {
        self.config.slow_period + self.config.signal_period + 1
    }

    fn process(&mut self, candle: &Candle) -> Result<Signal> {
        self.macd.update(candle.close);

        let Some(histogram) = self.macd.histogram() else {
            return Ok(Signal::hold("MACD indicator not ready".to_string()));
        };

        debug!("MACD histogram: {:.4}", histogram);

        let crossover = detect_crossover(self.last_histogram, histogram);
        self.last_histogram = Some(histogram);

        let strong_enough = histogram.abs() >= self.config.min_histogram;
        match crossover {
            Some(Crossover::Bullish) if strong_enough => Ok(Signal::buy(
                candle.close,
                format!("MACD bullish crossover: histogram={:.4}", histogram),
            )),
            Some(Crossover::Bearish) if strong_enough => Ok(Signal::sell(
                candle.close,
                format!("MACD bearish crossover: histogram={:.4}", histogram),
            )),
            _ => Ok(Signal::hold(format!("MACD in neutral zone: histogram={:.4}", histogram))),
        }
    }

    fn is_ready(&self) -> bool {
        self.macd.is_ready()
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
    fn trend_reversal_produces_both_signals() {
        let mut strategy = MACDStrategy::new(MACDStrategyConfig::default()).unwrap();
        let mut signals = Vec::new();
        // down, then up, then down again
        let prices = (0..60)
            .map(|i| 200.0 - i as f64)
            .chain((0..60).map(|i| 140.0 + 2.0 * i as f64))
            .chain((0..60).map(|i| 260.0 - 2.0 * i as f64));
        for (i, price) in prices.enumerate() {
            signals.push(strategy.process(&candle(price, i as i64)).unwrap().signal_type);
        }
        assert!(signals.contains(&SignalType::Buy));
        assert!(signals.contains(&SignalType::Sell));
    }

    #[test]
    fn fast_must_be_below_slow() {
        let config = MACDStrategyConfig {
            fast_period: 26,
            slow_period: 12,
            ..Default::default()
        };
        assert!(MACDStrategy::new(config).is_err());
    }
}
