//! Walk-forward evaluation.
//!
//! The candle history is cut into windows of `window` candles. The head of
//! each window (`train_ratio` of it) is the in-sample part: the parameter
//! grid is swept there and the best point kept. That point is then scored on
//! the tail, the out-of-sample part. Windows advance by the out-of-sample
//! length, so the tails tile the history without overlap.
//!
//! The strategy runs over the whole window so its indicators are warm when
//! the tail starts; only trades stamped inside the tail are scored.

use std::ops::Range;

use tracing::{debug, info};

use crate::domain::backtest::{evaluate_trades, BacktestConfig, BacktestResult};
use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::domain::strategy::{create_strategy, StrategyKind};
use crate::domain::sweep::run_sweep;
use crate::domain::trade::Trade;

pub const DEFAULT_WINDOW: usize = 90;
pub const DEFAULT_TRAIN_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardConfig {
    /// Candles per window.
    pub window: usize,
    /// In-sample share of each window.
    pub train_ratio: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            train_ratio: DEFAULT_TRAIN_RATIO,
        }
    }
}

impl WalkForwardConfig {
    /// In-sample and out-of-sample lengths, both at least one candle.
    pub fn split(&self) -> Result<(usize, usize), TradelabError> {
        let r = self.train_ratio;
        if !(r > 0.0 && r < 1.0) {
            return Err(invalid(
                "train_ratio",
                format!("must be between 0 and 1 exclusive, got {r}"),
            ));
        }
        // 90 × 0.7 is 62.999… in binary
        let train = (self.window as f64 * r + 1e-9).floor() as usize;
        let test = self.window.saturating_sub(train);
        if train == 0 || test == 0 {
            return Err(invalid(
                "window",
                format!(
                    "{} candles at ratio {} leaves an empty segment",
                    self.window, r
                ),
            ));
        }
        Ok((train, test))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardWindow {
    pub in_sample: Range<usize>,
    pub out_of_sample: Range<usize>,
    /// Best grid point on the in-sample candles.
    pub params: Vec<f64>,
    pub in_sample_result: BacktestResult,
    pub out_of_sample_result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardReport {
    pub windows: Vec<WalkForwardWindow>,
    /// All out-of-sample trades folded together from the initial balance.
    pub aggregate: BacktestResult,
}

fn invalid(key: &str, reason: String) -> TradelabError {
    TradelabError::ConfigInvalid {
        section: "walk_forward".into(),
        key: key.into(),
        reason,
    }
}

/// `(in_sample, out_of_sample)` index ranges over a history of `len`
/// candles. Empty when the history is shorter than one window.
pub fn split_windows(
    len: usize,
    config: &WalkForwardConfig,
) -> Result<Vec<(Range<usize>, Range<usize>)>, TradelabError> {
    let (train, test) = config.split()?;
    let mut windows = Vec::new();
    let mut start: usize = 0;
    while start.checked_add(config.window).is_some_and(|end| end <= len) {
        let boundary = start + train;
        windows.push((start..boundary, boundary..start + config.window));
        start += test;
    }
    Ok(windows)
}

/// Walk `kind` forward over `candles`, which must be in time order.
pub fn walk_forward(
    kind: StrategyKind,
    grid: &[Vec<f64>],
    candles: &[Candle],
    backtest: &BacktestConfig,
    config: &WalkForwardConfig,
) -> Result<WalkForwardReport, TradelabError> {
    let splits = split_windows(candles.len(), config)?;
    if splits.is_empty() {
        return Err(TradelabError::InsufficientData {
            candles: candles.len(),
            minimum: config.window,
        });
    }

    let mut windows = Vec::with_capacity(splits.len());
    let mut out_of_sample_trades: Vec<Trade> = Vec::new();

    for (in_sample, out_of_sample) in splits {
        let best = run_sweep(kind, grid, &candles[in_sample.clone()], backtest)?
            .into_iter()
            .next()
            .ok_or_else(|| TradelabError::ConfigInvalid {
                section: "sweep".into(),
                key: "range".into(),
                reason: "parameter grid is empty".into(),
            })?;

        let boundary = candles[out_of_sample.start].timestamp;
        let trades: Vec<Trade> = create_strategy(kind, &best.params)
            .analyze(&candles[in_sample.start..out_of_sample.end])
            .into_iter()
            .filter(|t| t.timestamp >= boundary)
            .collect();
        out_of_sample_trades.extend(trades.iter().cloned());
        let out_of_sample_result = evaluate_trades(trades, backtest);

        debug!(
            in_sample = ?in_sample,
            out_of_sample = ?out_of_sample,
            params = ?best.params,
            in_sample_balance = best.result.final_balance,
            out_of_sample_balance = out_of_sample_result.final_balance,
            "walk-forward window"
        );

        windows.push(WalkForwardWindow {
            in_sample,
            out_of_sample,
            params: best.params,
            in_sample_result: best.result,
            out_of_sample_result,
        });
    }

    let aggregate = evaluate_trades(out_of_sample_trades, backtest);
    info!(
        strategy = %kind,
        windows = windows.len(),
        trades = aggregate.trades.len(),
        final_balance = aggregate.final_balance,
        "walk-forward complete"
    );

    Ok(WalkForwardReport { windows, aggregate })
}
