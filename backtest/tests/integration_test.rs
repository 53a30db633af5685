//! Integration tests for the backtest crate

use backtest::prelude::*;
use chrono::{Duration, TimeZone, Utc};

fn series_from_closes(closes: &[f64]) -> CandleSeries {
    let base_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            Candle::new(
                *close,
                close * 1.01,
                close * 0.99,
                *close,
                1000.0,
                base_time + Duration::days(i as i64),
                "BTC".to_string(),
                "daily".to_string(),
            )
        })
        .collect();
    CandleSeries::from_vec(candles)
}

fn sine_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + 20.0 * (i as f64 / 8.0).sin())
        .collect()
}

fn run(kind: &str, config: BacktestConfig, series: &CandleSeries) -> Result<BacktestResult, BacktestError> {
    let mut strategy = build_strategy(kind, &StrategyParams::default())?;
    BacktestEngine::new(config).run(strategy.as_mut(), series)
}

#[test]
fn equity_curve_has_one_point_per_candle() {
    let series = series_from_closes(&sine_closes(120));
    let result = run("sma_crossover", BacktestConfig::default(), &series).unwrap();
    assert_eq!(result.equity_curve.len(), series.len());
    assert_eq!(result.candles, 120);
    assert_eq!(result.start, series.first().unwrap().timestamp);
    assert_eq!(result.end, series.last().unwrap().timestamp);
}

#[test]
fn final_equity_is_capital_plus_trade_pnl() {
    let series = series_from_closes(&sine_closes(200));
    for kind in ["sma_crossover", "rsi", "macd", "bollinger", "buy_and_hold"] {
        let result = run(kind, BacktestConfig::default(), &series).unwrap();
        let pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
        assert!(
            (result.final_equity - (result.initial_capital + pnl)).abs() < 1e-6,
            "{} equity mismatch",
            kind
        );
        let last_point = result.equity_curve.last().unwrap().equity;
        assert!((last_point - result.final_equity).abs() < 1e-6);
    }
}

#[test]
fn oscillating_prices_produce_round_trips() {
    let series = series_from_closes(&sine_closes(200));
    let result = run("sma_crossover", BacktestConfig::default(), &series).unwrap();
    assert!(result.num_trades >= 2);
    assert_eq!(result.num_trades, result.trades.len());
}

#[test]
fn buy_and_hold_matches_price_change_less_fees() {
    let series = series_from_closes(&[100.0, 105.0, 110.0, 120.0]);
    let config = BacktestConfig {
        initial_capital: 1000.0,
        fee_rate: 0.01,
        ..Default::default()
    };
    let result = run("buy_and_hold", config, &series).unwrap();
    let expected = 1000.0 * 0.99 * 0.99 * 1.2;
    assert!((result.final_equity - expected).abs() < 1e-9);
    assert_eq!(result.num_trades, 1);
    assert_eq!(result.trades[0].exit_reason, ExitReason::EndOfData);
    assert!((result.benchmark_return_percent - 20.0).abs() < 1e-9);
}

#[test]
fn stop_loss_closes_losing_position() {
    let series = series_from_closes(&[100.0, 99.0, 90.0, 80.0]);
    let config = BacktestConfig {
        fee_rate: 0.0,
        stop_loss: Some(0.05),
        ..Default::default()
    };
    let result = run("buy_and_hold", config, &series).unwrap();
    assert_eq!(result.num_trades, 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::StopLoss);
    // candle 2 gaps down (opens at 90), so the stop fills at the open
    assert!((trade.exit_price - 90.0).abs() < 1e-9);
    // equity bottoms at the 90 fill: 10% below the entry
    assert!((result.max_drawdown_percent - 10.0).abs() < 1e-6);
}

#[test]
fn take_profit_fills_at_target() {
    let series = series_from_closes(&[100.0, 101.0, 101.5, 102.0]);
    let config = BacktestConfig {
        fee_rate: 0.0,
        take_profit: Some(0.02),
        ..Default::default()
    };
    let result = run("buy_and_hold", config, &series).unwrap();
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    // high of the 101.0 candle is 102.01
    assert!((trade.exit_price - 102.0).abs() < 1e-9);
}

#[test]
fn empty_series_is_rejected() {
    let err = run("buy_and_hold", BacktestConfig::default(), &CandleSeries::new()).unwrap_err();
    assert!(matches!(err, BacktestError::NotEnoughData(_)));
}

#[test]
fn short_series_is_rejected() {
    let series = series_from_closes(&[1.0, 2.0, 3.0]);
    let err = run("sma_crossover", BacktestConfig::default(), &series).unwrap_err();
    assert!(matches!(err, BacktestError::NotEnoughData(_)));
}

#[test]
fn invalid_capital_is_rejected() {
    let series = series_from_closes(&[1.0, 2.0]);
    let config = BacktestConfig {
        initial_capital: 0.0,
        ..Default::default()
    };
    let err = run("buy_and_hold", config, &series).unwrap_err();
    assert_eq!(err, BacktestError::InvalidCapital(0.0));
}

#[test]
fn report_mentions_strategy_and_symbol() {
    let series = series_from_closes(&sine_closes(60));
    let result = run("buy_and_hold", BacktestConfig::default(), &series).unwrap();
    let text = BacktestReport::new(&result).format();
    assert!(text.contains("buy_and_hold on BTC (daily)"));
    assert!(text.contains("Number of Trades: 1"));
}
