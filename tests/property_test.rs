//! Property tests for indicator and strategy invariants.

mod common;

use common::*;
use proptest::prelude::*;
use tradelab::domain::backtest::{evaluate_trades, BacktestConfig};
use tradelab::domain::indicator::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma,
};
use tradelab::domain::strategy::{
    create_strategy, EnhancedRsiStrategy, Strategy as _, StrategyKind,
};
use tradelab::domain::sweep::{ParameterRange, MAX_RANGE_VALUES};
use tradelab::domain::trade::Side;

fn prices(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, min_len..max_len)
}

/// Random walk with steps of up to ±5%.
fn walk(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.05f64..0.05, len).prop_map(|steps| {
        steps
            .iter()
            .scan(100.0, |price, step| {
                *price *= 1.0 + step;
                Some(*price)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn sma_is_mean_of_tail(series in prices(1, 60), period in 1usize..30) {
        prop_assume!(period <= series.len());
        let tail = &series[series.len() - period..];
        let expected = tail.iter().sum::<f64>() / period as f64;
        let sma = calculate_sma(&series, period).unwrap();
        prop_assert!((sma - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn rsi_stays_in_range(series in prices(2, 80), period in 1usize..20) {
        for value in calculate_rsi(&series, period).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value), "rsi {}", value);
        }
    }

    #[test]
    fn bollinger_bands_are_ordered(
        series in prices(1, 80),
        period in 1usize..25,
        multiplier in 0.0f64..4.0,
    ) {
        for band in calculate_bollinger(&series, period, multiplier).into_iter().flatten() {
            prop_assert!(band.upper >= band.middle);
            prop_assert!(band.middle >= band.lower);
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal(
        series in prices(1, 80),
        fast in 1usize..15,
        slow in 1usize..30,
        signal in 1usize..10,
    ) {
        let macd = calculate_macd(&series, fast, slow, signal);
        prop_assert_eq!(macd.histogram.len(), series.len());
        for i in 0..series.len() {
            match (macd.line[i], macd.signal[i], macd.histogram[i]) {
                (Some(line), Some(sig), Some(hist)) => prop_assert_eq!(hist, line - sig),
                (_, _, None) => {}
                other => prop_assert!(false, "histogram defined without inputs: {:?}", other),
            }
        }
    }

    #[test]
    fn enhanced_rsi_never_nests_positions(series in walk(120)) {
        let mut strategy = EnhancedRsiStrategy::default();
        strategy.update_parameters(&[3.0, 8.0, 35.0, 65.0, 0.02, 0.04]);
        let trades = strategy.analyze(&candles_from_closes(&series));

        // replay: entries only while flat, exits only on the opposite side
        let mut open: Option<Side> = None;
        for trade in &trades {
            let exiting = matches!(trade.reason.as_str(), "Stop Loss" | "Take Profit");
            match open {
                None => {
                    prop_assert!(!exiting, "exit while flat");
                    open = Some(trade.side);
                }
                Some(entry) => {
                    prop_assert!(exiting, "entry while open");
                    prop_assert_ne!(trade.side, entry);
                    open = None;
                }
            }
        }
        prop_assert_eq!(open.is_some(), strategy.position().is_open());
    }

    #[test]
    fn short_parameter_vectors_are_ignored(extra in prop::collection::vec(0.0f64..100.0, 0..6)) {
        for kind in StrategyKind::ALL {
            let mut strategy = create_strategy(kind, &[]);
            let before = strategy.parameters();
            let short = &extra[..extra.len().min(kind.required_params() - 1)];
            strategy.update_parameters(short);
            prop_assert_eq!(strategy.parameters(), before);
        }
    }

    #[test]
    fn range_expansion_is_bounded(
        min in prop::num::f64::ANY,
        max in prop::num::f64::ANY,
        step in prop::num::f64::ANY,
    ) {
        if let Ok(values) = ParameterRange::new(min, max, step).values() {
            prop_assert!(!values.is_empty());
            prop_assert!(values.len() <= MAX_RANGE_VALUES);
            prop_assert_eq!(values[0], min);
        }
    }

    #[test]
    fn balance_matches_cash_flows(
        sides in prop::collection::vec(any::<bool>(), 0..20),
        price in 1.0f64..500.0,
        commission in 0.0f64..0.01,
    ) {
        let trades: Vec<_> = sides
            .iter()
            .map(|&buy| trade(if buy { Side::Buy } else { Side::Sell }, price))
            .collect();
        let config = BacktestConfig { initial_balance: 10_000.0, commission };
        let expected = trades.iter().fold(10_000.0, |balance, t| match t.side {
            Side::Buy => balance - price * (1.0 + commission),
            Side::Sell => balance + price * (1.0 - commission),
        });

        let result = evaluate_trades(trades, &config);

        prop_assert!((result.final_balance - expected).abs() < 1e-6);
        prop_assert!(result.max_drawdown >= 0.0);
        prop_assert!(result.wins <= result.trades.len());
        prop_assert!((0.0..=1.0).contains(&result.win_rate));
    }
}
