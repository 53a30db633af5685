//! Bollinger Bands mean-reversion strategy

use crate::data::Candle;
use crate::indicators::{BollingerBands, Indicator};
use crate::strategy::{Signal, Strategy, StrategyParams};
use crate::Result;

#[derive(Debug, Clone)]
pub struct BollingerConfig {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

impl BollingerConfig {
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            period: params.positive_usize("period", defaults.period)?,
            multiplier: params.get("multiplier", defaults.multiplier)?,
        })
    }
}

/// Buys a close below the lower band, sells a close above the upper band.
pub struct BollingerStrategy {
    config: BollingerConfig,
    bands: BollingerBands,
}

impl BollingerStrategy {
    pub fn new(config: BollingerConfig) -> Result<Self> {
        Ok(Self {
            bands: BollingerBands::new(config.period, config.multiplier)?,
            config,
        })
    }
}

impl Strategy for BollingerStrategy {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn warmup_candles(&self) -> usize {
        self.config.period
    }

    fn process(&mut self, candle: &Candle) -> Result<Signal> {
        self.bands.update(candle.close);

        let (Some(lower), Some(upper)) = (self.bands.lower(), self.bands.upper()) else {
            return Ok(Signal::hold("bands not ready".to_string()));
        };

        Ok(if candle.close < lower {
            Signal::buy(candle.close, format!("close {:.4} below lower band {:.4}", candle.close, lower))
        } else if candle.close > upper {
            Signal::sell(candle.close, format!("close {:.4} above upper band {:.4}", candle.close, upper))
        } else {
            Signal::hold("inside bands".to_string())
        })
    }

    fn is_ready(&self) -> bool {
        self.bands.is_ready()
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
            "SOL".to_string(),
            "daily".to_string(),
        )
    }

    #[test]
    fn sharp_drop_after_flat_range_buys() {
        let mut strategy = BollingerStrategy::new(BollingerConfig {
            period: 10,
            multiplier: 2.0,
        })
        .unwrap();
        for i in 0..9 {
            let price = if i % 2 == 0 { 100.0 } else { 101.0 };
            strategy.process(&candle(price, i)).unwrap();
        }
        // mean 98.4, sd ~6.15, lower band ~86.1
        let signal = strategy.process(&candle(80.0, 9)).unwrap();
        assert_eq!(signal.signal_type, SignalType::Buy);
    }

    #[test]
    fn non_positive_multiplier_is_rejected() {
        let mut params = StrategyParams::default();
        params.set("multiplier", "0");
        let config = BollingerConfig::from_params(&params).unwrap();
        assert!(BollingerStrategy::new(config).is_err());
    }
}
