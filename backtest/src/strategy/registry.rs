//! Builds strategies from the name stored in `crypto_strategies.strategy_type`

use crate::error::BacktestError;
use crate::strategy::implementations::*;
use crate::strategy::{Strategy, StrategyParams};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SmaCrossover,
    Rsi,
    Macd,
    Bollinger,
    BuyAndHold,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::SmaCrossover,
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::Bollinger,
        StrategyKind::BuyAndHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::SmaCrossover => "sma_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::BuyAndHold => "buy_and_hold",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| BacktestError::UnknownStrategy(s.to_string()))
    }
}

pub fn build_strategy(kind: &str, params: &StrategyParams) -> Result<Box<dyn Strategy>> {
    let strategy: Box<dyn Strategy> = match kind.parse::<StrategyKind>()? {
        StrategyKind::SmaCrossover => {
            Box::new(SmaCrossoverStrategy::new(SmaCrossoverConfig::from_params(params)?)?)
        }
        StrategyKind::Rsi => Box::new(RSIStrategy::new(RSIStrategyConfig::from_params(params)?)?),
        StrategyKind::Macd => Box::new(MACDStrategy::new(MACDStrategyConfig::from_params(params)?)?),
        StrategyKind::Bollinger => Box::new(BollingerStrategy::new(BollingerConfig::from_params(params)?)?),
        StrategyKind::BuyAndHold => Box::new(BuyAndHoldStrategy::new()),
    };
    Ok(strategy)
}
