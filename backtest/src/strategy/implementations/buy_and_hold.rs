//! Benchmark strategy: buy on the first candle and never sell

use crate::data::Candle;
use crate::strategy::{Signal, Strategy};
use crate::Result;

#[derive(Debug, Default)]
pub struct BuyAndHoldStrategy {
    bought: bool,
}

impl BuyAndHoldStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn warmup_candles(&self) -> usize {
        1
    }

    fn process(&mut self, candle: &Candle) -> Result<Signal> {
        if self.bought {
            return Ok(Signal::hold("holding".to_string()));
        }
        self.bought = true;
        Ok(Signal::buy(candle.close, "initial entry".to_string()))
    }

    fn is_ready(&self) -> bool {
        true
    }
}
