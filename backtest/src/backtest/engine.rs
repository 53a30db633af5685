//! Backtesting engine

use crate::backtest::metrics::{max_drawdown, MetricsCalculator};
use crate::data::{Candle, CandleSeries};
use crate::error::BacktestError;
use crate::strategy::{SignalType, Strategy};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting cash
    pub initial_capital: f64,
    /// Fee charged on both entry and exit, as a fraction of traded value
    pub fee_rate: f64,
    /// Fraction of available cash committed on each entry
    pub position_fraction: f64,
    /// Exit when price falls this fraction below entry (0.05 = 5%)
    pub stop_loss: Option<f64>,
    /// Exit when price rises this fraction above entry
    pub take_profit: Option<f64>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            fee_rate: 0.001,
            position_fraction: 1.0,
            stop_loss: None,
            take_profit: None,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_capital > 0.0) || !self.initial_capital.is_finite() {
            return Err(BacktestError::InvalidCapital(self.initial_capital));
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(BacktestError::invalid("fee_rate", "must be within [0, 1)"));
        }
        if !(self.position_fraction > 0.0 && self.position_fraction <= 1.0) {
            return Err(BacktestError::invalid("position_fraction", "must be within (0, 1]"));
        }
        for (name, value) in [("stop_loss", self.stop_loss), ("take_profit", self.take_profit)] {
            if let Some(v) = value {
                if !(v > 0.0) || !v.is_finite() {
                    return Err(BacktestError::invalid(name, "must be a positive fraction"));
                }
            }
        }
        if let Some(sl) = self.stop_loss {
            if sl >= 1.0 {
                return Err(BacktestError::invalid("stop_loss", "must be below 1"));
            }
        }
        Ok(())
    }
}

/// Why a trade was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    EndOfData,
}

/// Trade record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    /// Net of fees on both legs
    pub pnl: f64,
    pub pnl_percent: f64,
    pub exit_reason: ExitReason,
}

/// Running equity after a candle closed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: f64,
}

/// Backtest result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub symbol: String,
    pub timeframe: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub candles: usize,
    /// Starting balance
    pub initial_capital: f64,
    /// Ending balance
    pub final_equity: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
    /// Close-to-close change of the underlying over the same window
    pub benchmark_return_percent: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    /// Gross profit over gross loss; `None` when nothing lost
    pub profit_factor: Option<f64>,
    pub expectancy: f64,
    /// Largest peak-to-trough fall of the equity curve, in percent
    pub max_drawdown_percent: f64,
    pub sharpe_ratio: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug, Clone)]
struct OpenPosition {
    entry_time: DateTime<Utc>,
    entry_price: f64,
    quantity: f64,
    /// Cash spent including the entry fee
    cost: f64,
}

/// Mutable state of one run
struct Simulation<'a> {
    config: &'a BacktestConfig,
    cash: f64,
    position: Option<OpenPosition>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl<'a> Simulation<'a> {
    fn new(config: &'a BacktestConfig, capacity: usize) -> Self {
        Self {
            config,
            cash: config.initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::with_capacity(capacity),
        }
    }

    fn open(&mut self, candle: &Candle) {
        if candle.close <= 0.0 {
            return;
        }
        let spend = self.cash * self.config.position_fraction;
        if spend <= 0.0 {
            return;
        }
        let quantity = spend * (1.0 - self.config.fee_rate) / candle.close;
        self.cash -= spend;
        debug!(price = candle.close, quantity, "Opening position");
        self.position = Some(OpenPosition {
            entry_time: candle.timestamp,
            entry_price: candle.close,
            quantity,
            cost: spend,
        });
    }

    fn close(&mut self, time: DateTime<Utc>, price: f64, reason: ExitReason) {
        let Some(position) = self.position.take() else {
            return;
        };
        let proceeds = position.quantity * price * (1.0 - self.config.fee_rate);
        let pnl = proceeds - position.cost;
        self.cash += proceeds;
        debug!(price, pnl, ?reason, "Closing position");
        self.trades.push(Trade {
            entry_time: position.entry_time,
            exit_time: time,
            entry_price: position.entry_price,
            exit_price: price,
            quantity: position.quantity,
            pnl,
            pnl_percent: pnl / position.cost * 100.0,
            exit_reason: reason,
        });
    }

    /// Stop-loss takes precedence over take-profit inside one candle.
    fn check_exits(&mut self, candle: &Candle) {
        let Some(position) = &self.position else {
            return;
        };
        if let Some(stop) = self.config.stop_loss {
            let stop_price = position.entry_price * (1.0 - stop);
            if candle.low <= stop_price {
                // a gap below the stop fills at the open
                let fill = stop_price.min(candle.open);
                self.close(candle.timestamp, fill, ExitReason::StopLoss);
                return;
            }
        }
        if let Some(target) = self.config.take_profit {
            let target_price = position.entry_price * (1.0 + target);
            if candle.high >= target_price {
                let fill = target_price.max(candle.open);
                self.close(candle.timestamp, fill, ExitReason::TakeProfit);
            }
        }
    }

    fn mark(&mut self, candle: &Candle) {
        let held = self
            .position
            .as_ref()
            .map(|p| p.quantity * candle.close)
            .unwrap_or(0.0);
        self.equity_curve.push(EquityPoint {
            time: candle.timestamp,
            equity: self.cash + held,
        });
    }
}

/// Backtesting engine
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create new backtest engine
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run backtest
    pub fn run(&self, strategy: &mut dyn Strategy, candles: &CandleSeries) -> Result<BacktestResult> {
        self.config.validate()?;

        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Err(BacktestError::NotEnoughData("no candles in range".to_string()));
        };
        if candles.len() < strategy.warmup_candles() {
            return Err(BacktestError::NotEnoughData(format!(
                "{} needs {} candles, got {}",
                strategy.name(),
                strategy.warmup_candles(),
                candles.len()
            )));
        }

        let mut sim = Simulation::new(&self.config, candles.len());

        for candle in candles.candles() {
            sim.check_exits(candle);

            let signal = strategy.process(candle)?;
            match signal.signal_type {
                SignalType::Buy if sim.position.is_none() => sim.open(candle),
                SignalType::Sell if sim.position.is_some() => {
                    sim.close(candle.timestamp, candle.close, ExitReason::Signal)
                }
                _ => {}
            }

            sim.mark(candle);
        }

        if sim.position.is_some() {
            sim.close(last.timestamp, last.close, ExitReason::EndOfData);
            if let Some(point) = sim.equity_curve.last_mut() {
                point.equity = sim.cash;
            }
        }

        let Simulation {
            cash,
            trades,
            equity_curve,
            ..
        } = sim;

        let initial = self.config.initial_capital;
        let total_return = cash - initial;
        let stats = MetricsCalculator::trade_stats(&trades);

        Ok(BacktestResult {
            strategy: strategy.name().to_string(),
            symbol: first.symbol.clone(),
            timeframe: first.timeframe.clone(),
            start: first.timestamp,
            end: last.timestamp,
            candles: candles.len(),
            initial_capital: initial,
            final_equity: cash,
            total_return,
            total_return_percent: total_return / initial * 100.0,
            benchmark_return_percent: candles.price_change_percent().unwrap_or(0.0),
            num_trades: trades.len(),
            winning_trades: stats.winning_trades,
            losing_trades: stats.losing_trades,
            win_rate: stats.win_rate,
            avg_profit: stats.avg_profit,
            avg_loss: stats.avg_loss,
            profit_factor: MetricsCalculator::profit_factor(&trades),
            expectancy: MetricsCalculator::expectancy(&trades),
            max_drawdown_percent: max_drawdown(&equity_curve) * 100.0,
            sharpe_ratio: MetricsCalculator::sharpe_ratio(&trades),
            trades,
            equity_curve,
        })
    }
}
