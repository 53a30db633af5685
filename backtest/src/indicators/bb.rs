//! Bollinger Bands indicator

use crate::error::BacktestError;
use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::{BollingerBands as TaBollingerBands, BollingerBandsOutput};
use ta::Next;

/// Bollinger Bands indicator wrapper
#[derive(Debug)]
pub struct BollingerBands {
    inner: TaBollingerBands,
    period: usize,
    update_count: usize,
    last_output: Option<BollingerBandsOutput>,
}

impl BollingerBands {
    /// Create new Bollinger Bands indicator
    pub fn new(period: usize, multiplier: f64) -> Result<Self> {
        if !(multiplier > 0.0) {
            return Err(BacktestError::invalid("multiplier", "must be positive"));
        }
        let inner = TaBollingerBands::new(period, multiplier)
            .map_err(|_| BacktestError::invalid("period", "must be greater than zero"))?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_output: None,
        })
    }

    /// Get upper band
    pub fn upper(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.upper)
    }

    /// Get middle band (SMA)
    pub fn middle(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.average)
    }

    /// Get lower band
    pub fn lower(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.lower)
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        "BollingerBands"
    }

    fn update(&mut self, value: f64) {
        let output = self.inner.next(value);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_output = Some(output);
        }
    }

    fn value(&self) -> Option<f64> {
        self.middle()
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}
