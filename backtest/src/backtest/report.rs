//! Backtest report generation

use crate::backtest::BacktestResult;

/// Plain-text report
#[derive(Debug)]
pub struct BacktestReport<'a> {
    result: &'a BacktestResult,
}

impl<'a> BacktestReport<'a> {
    pub fn new(result: &'a BacktestResult) -> Self {
        Self { result }
    }

    /// Format report as string
    pub fn format(&self) -> String {
        let r = self.result;
        let profit_factor = r
            .profit_factor
            .map(|pf| format!("{:.2}", pf))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            r#"
Backtest Results: {} on {} ({})
================
Period: {} .. {} ({} candles)
Starting Balance: ${:.2}
Ending Balance: ${:.2}
Total Return: ${:.2} ({:.2}%)
Buy & Hold Return: {:.2}%
Number of Trades: {}
Winning Trades: {}
Losing Trades: {}
Win Rate: {:.2}%
Average Profit: ${:.2}
Average Loss: ${:.2}
Profit Factor: {}
Expectancy: ${:.2}
Maximum Drawdown: {:.2}%
Sharpe Ratio: {:.2}
"#,
            r.strategy,
            r.symbol,
            r.timeframe,
            r.start.format("%Y-%m-%d %H:%M"),
            r.end.format("%Y-%m-%d %H:%M"),
            r.candles,
            r.initial_capital,
            r.final_equity,
            r.total_return,
            r.total_return_percent,
            r.benchmark_return_percent,
            r.num_trades,
            r.winning_trades,
            r.losing_trades,
            r.win_rate,
            r.avg_profit,
            r.avg_loss,
            profit_factor,
            r.expectancy,
            r.max_drawdown_percent,
            r.sharpe_ratio,
        )
    }
}
