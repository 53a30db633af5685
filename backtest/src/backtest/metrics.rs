//! Backtest performance metrics

use crate::backtest::{EquityPoint, Trade};

/// Win/loss breakdown of closed trades
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeStats {
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of trades with positive P&L
    pub win_rate: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn trade_stats(trades: &[Trade]) -> TradeStats {
        let wins: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = trades.iter().map(|t| t.pnl).filter(|p| *p < 0.0).collect();
        TradeStats {
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: if trades.is_empty() {
                0.0
            } else {
                wins.len() as f64 / trades.len() as f64 * 100.0
            },
            avg_profit: mean(&wins),
            avg_loss: mean(&losses),
        }
    }

    /// Gross profit divided by gross loss
    pub fn profit_factor(trades: &[Trade]) -> Option<f64> {
        let gross_profit: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p > 0.0).sum();
        let gross_loss: f64 = trades.iter().map(|t| t.pnl).filter(|p| *p < 0.0).sum::<f64>().abs();
        if gross_loss == 0.0 {
            None
        } else {
            Some(gross_profit / gross_loss)
        }
    }

    /// Average P&L per trade
    pub fn expectancy(trades: &[Trade]) -> f64 {
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
        mean(&pnls)
    }

    /// Mean over standard deviation of per-trade returns (not annualised)
    pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
        if trades.len() < 2 {
            return 0.0;
        }
        let returns: Vec<f64> = trades.iter().map(|t| t.pnl_percent / 100.0).collect();
        let avg = mean(&returns);
        let variance = returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / returns.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev > 0.0 {
            avg / std_dev
        } else {
            0.0
        }
    }
}

/// Largest peak-to-trough decline of the equity curve, as a fraction of the peak
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0;
    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let drawdown = (peak - point.equity) / peak;
            if drawdown > worst {
                worst = drawdown;
            }
        }
    }
    worst
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::ExitReason;
    use chrono::Utc;

    fn trade(pnl: f64, pnl_percent: f64) -> Trade {
        Trade {
            entry_time: Utc::now(),
            exit_time: Utc::now(),
            entry_price: 100.0,
            exit_price: 100.0,
            quantity: 1.0,
            pnl,
            pnl_percent,
            exit_reason: ExitReason::Signal,
        }
    }

    fn point(equity: f64) -> EquityPoint {
        EquityPoint {
            time: Utc::now(),
            equity,
        }
    }

    #[test]
    fn drawdown_from_curve() {
        let curve = [point(100.0), point(120.0), point(90.0), point(130.0), point(117.0)];
        assert!((max_drawdown(&curve) - 0.25).abs() < 1e-12);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn trade_breakdown() {
        let trades = [trade(30.0, 3.0), trade(-10.0, -1.0), trade(10.0, 1.0), trade(0.0, 0.0)];
        let stats = MetricsCalculator::trade_stats(&trades);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 1);
        assert_eq!(stats.win_rate, 50.0);
        assert_eq!(stats.avg_profit, 20.0);
        assert_eq!(stats.avg_loss, -10.0);
        assert_eq!(MetricsCalculator::profit_factor(&trades), Some(4.0));
        assert_eq!(MetricsCalculator::expectancy(&trades), 7.5);
    }

    #[test]
    fn no_losses_means_no_profit_factor() {
        assert_eq!(MetricsCalculator::profit_factor(&[trade(5.0, 0.5)]), None);
        assert_eq!(MetricsCalculator::sharpe_ratio(&[trade(5.0, 0.5)]), 0.0);
    }
}
