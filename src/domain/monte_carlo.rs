//! Monte Carlo trade-order resampling.
//!
//! A finished trade list is shuffled many times and every ordering is folded
//! again through [`evaluate_trades`]. Final balance and Sharpe ratio do not
//! depend on order, drawdown and win rate do; the spread of the latter shows
//! how much of a result came from the sequence the trades arrived in.
//!
//! Simulation `i` draws from its own `StdRng` seeded with `seed + i`, so a
//! fixed seed reproduces the report exactly whatever the rayon pool size.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::info;

use crate::domain::backtest::{evaluate_trades, BacktestConfig};
use crate::domain::error::TradelabError;
use crate::domain::trade::Trade;

pub const DEFAULT_SIMULATIONS: usize = 1000;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    pub simulations: usize,
    /// Two-sided interval width, strictly between 0 and 1.
    pub confidence_level: f64,
    /// Base seed; a random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            confidence_level: DEFAULT_CONFIDENCE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// One metric across all simulations.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// In simulation order.
    pub samples: Vec<f64>,
    pub interval: ConfidenceInterval,
}

impl Distribution {
    /// Empirical interval: the sorted samples at `⌊(1 − c)/2 · n⌋` and
    /// `⌊(1 + c)/2 · n⌋`, the upper index clamped to the last sample.
    pub fn new(samples: Vec<f64>, confidence_level: f64) -> Self {
        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let index = |q: f64| ((q * n as f64).floor() as usize).min(n.saturating_sub(1));
        let interval = match (
            sorted.get(index((1.0 - confidence_level) / 2.0)),
            sorted.get(index((1.0 + confidence_level) / 2.0)),
        ) {
            (Some(&lower), Some(&upper)) => ConfidenceInterval { lower, upper },
            _ => ConfidenceInterval {
                lower: 0.0,
                upper: 0.0,
            },
        };

        Self { samples, interval }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloReport {
    /// Base seed actually used.
    pub seed: u64,
    pub win_rate: Distribution,
    pub max_drawdown: Distribution,
    pub final_balance: Distribution,
    pub sharpe_ratio: Distribution,
}

fn invalid(key: &str, reason: String) -> TradelabError {
    TradelabError::ConfigInvalid {
        section: "monte_carlo".into(),
        key: key.into(),
        reason,
    }
}

pub fn validate_monte_carlo_config(config: &MonteCarloConfig) -> Result<(), TradelabError> {
    if config.simulations == 0 {
        return Err(invalid("simulations", "must be at least 1".into()));
    }
    let c = config.confidence_level;
    if !(c > 0.0 && c < 1.0) {
        return Err(invalid(
            "confidence",
            format!("must be between 0 and 1 exclusive, got {c}"),
        ));
    }
    Ok(())
}

/// Re-evaluate `trades` under `config.simulations` random orderings.
pub fn simulate(
    trades: &[Trade],
    backtest: &BacktestConfig,
    config: &MonteCarloConfig,
) -> Result<MonteCarloReport, TradelabError> {
    validate_monte_carlo_config(config)?;
    let seed = config.seed.unwrap_or_else(rand::random);

    let runs: Vec<[f64; 4]> = (0..config.simulations)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut shuffled = trades.to_vec();
            shuffled.shuffle(&mut rng);
            let result = evaluate_trades(shuffled, backtest);
            [
                result.win_rate,
                result.max_drawdown,
                result.final_balance,
                result.sharpe_ratio,
            ]
        })
        .collect();

    let column = |k: usize| {
        Distribution::new(runs.iter().map(|r| r[k]).collect(), config.confidence_level)
    };
    let report = MonteCarloReport {
        seed,
        win_rate: column(0),
        max_drawdown: column(1),
        final_balance: column(2),
        sharpe_ratio: column(3),
    };

    info!(
        trades = trades.len(),
        simulations = config.simulations,
        seed,
        drawdown_upper = report.max_drawdown.interval.upper,
        "monte carlo complete"
    );

    Ok(report)
}
