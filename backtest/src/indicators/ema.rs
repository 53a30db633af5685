//! EMA (Exponential Moving Average) indicator

use crate::error::BacktestError;
use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// EMA indicator wrapper
#[derive(Debug)]
pub struct EMA {
    inner: ExponentialMovingAverage,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl EMA {
    /// Create new EMA indicator
    pub fn new(period: usize) -> Result<Self> {
        let inner = ExponentialMovingAverage::new(period)
            .map_err(|_| BacktestError::invalid("period", "must be greater than zero"))?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_value: None,
        })
    }
}

impl Indicator for EMA {
    fn name(&self) -> &str {
        "EMA"
    }

    fn update(&mut self, value: f64) {
        let ema_value = self.inner.next(value);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_value = Some(ema_value);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

