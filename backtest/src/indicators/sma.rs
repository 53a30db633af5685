//! SMA (Simple Moving Average) indicator

use crate::error::BacktestError;
use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::SimpleMovingAverage;
use ta::Next;

/// SMA indicator wrapper
#[derive(Debug)]
pub struct SMA {
    inner: SimpleMovingAverage,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl SMA {
    /// Create new SMA indicator
    pub fn new(period: usize) -> Result<Self> {
        let inner = SimpleMovingAverage::new(period)
            .map_err(|_| BacktestError::invalid("period", "must be greater than zero"))?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_value: None,
        })
    }
}

impl Indicator for SMA {
    fn name(&self) -> &str {
        "SMA"
    }

    fn update(&mut self, value: f64) {
        let sma_value = self.inner.next(value);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_value = Some(sma_value);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_averages_last_period_values() {
        let mut sma = SMA::new(2).unwrap();
        let values: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&v| {
                sma.update(v);
                sma.value()
            })
            .collect();
        assert_eq!(values, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(SMA::new(0).is_err());
    }
}
