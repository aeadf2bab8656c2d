//! Parameter sweep: backtest every point of a parameter grid.
//!
//! Each grid point gets its own strategy instance, so the evaluations share
//! no mutable state and run in parallel on the rayon pool.

use rayon::prelude::*;
use tracing::info;

use crate::domain::backtest::{BacktestConfig, BacktestResult, Backtester};
use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::domain::strategy::{create_strategy, StrategyKind};

/// Most values one range may expand to.
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Most parameter vectors one grid may hold.
pub const MAX_GRID_POINTS: usize = 1_000_000;

fn range_error(reason: String) -> TradelabError {
    TradelabError::ConfigInvalid {
        section: "sweep".into(),
        key: "range".into(),
        reason,
    }
}

/// Inclusive range of values for one positional parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// A range holding only `value`.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, 0.0)
    }

    /// `min, min + step, ...` up to and including `max`. A non-positive step
    /// or `max < min` yields `[min]`. Non-finite bounds and ranges longer
    /// than [`MAX_RANGE_VALUES`] are rejected.
    pub fn values(&self) -> Result<Vec<f64>, TradelabError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(range_error(format!(
                "bounds must be finite, got {}:{}",
                self.min, self.max
            )));
        }
        if self.step <= 0.0 || !self.step.is_finite() || self.max < self.min {
            return Ok(vec![self.min]);
        }
        // tolerate accumulated rounding at the upper bound
        let steps = ((self.max - self.min) / self.step + 1e-9).floor();
        if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
            return Err(range_error(format!(
                "{}:{}:{} expands past {} values",
                self.min, self.max, self.step, MAX_RANGE_VALUES
            )));
        }
        let count = steps as usize + 1;
        Ok((0..count).map(|i| self.min + self.step * i as f64).collect())
    }
}

impl std::str::FromStr for ParameterRange {
    type Err = TradelabError;

    /// `value` or `min:max:step`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| range_error(format!("'{}': {}", s, reason));
        let parts = s
            .split(':')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| invalid("expected numbers"))?;
        if parts.iter().any(|p| !p.is_finite()) {
            return Err(invalid("values must be finite"));
        }

        match parts.as_slice() {
            [value] => Ok(Self::fixed(*value)),
            [min, max, step] => Ok(Self::new(*min, *max, *step)),
            _ => Err(invalid("expected value or min:max:step")),
        }
    }
}

/// Cartesian product of the ranges, in positional order. The first range
/// varies slowest. Fails when a range is invalid or the product exceeds
/// [`MAX_GRID_POINTS`].
pub fn parameter_grid(ranges: &[ParameterRange]) -> Result<Vec<Vec<f64>>, TradelabError> {
    let axes = ranges
        .iter()
        .map(ParameterRange::values)
        .collect::<Result<Vec<_>, _>>()?;

    let points = axes
        .iter()
        .try_fold(1usize, |total, values| total.checked_mul(values.len()))
        .filter(|&total| total <= MAX_GRID_POINTS)
        .ok_or_else(|| range_error(format!("grid exceeds {} points", MAX_GRID_POINTS)))?;

    let grid = axes.iter().fold(vec![Vec::new()], |grid, values| {
        grid.iter()
            .flat_map(|prefix| {
                values.iter().map(move |&v| {
                    let mut params = prefix.clone();
                    params.push(v);
                    params
                })
            })
            .collect()
    });
    debug_assert_eq!(grid.len(), points);
    Ok(grid)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub params: Vec<f64>,
    pub result: BacktestResult,
}

/// Backtest `kind` at every parameter vector in `grid`. Outcomes are sorted
/// best first: highest final balance, then highest Sharpe ratio.
pub fn run_sweep(
    kind: StrategyKind,
    grid: &[Vec<f64>],
    candles: &[Candle],
    config: &BacktestConfig,
) -> Result<Vec<SweepOutcome>, TradelabError> {
    let mut outcomes = grid
        .par_iter()
        .map(|params| {
            let mut backtester = Backtester::new(config.clone());
            backtester.set_strategy(create_strategy(kind, params));
            backtester.run(candles).map(|result| SweepOutcome {
                params: params.clone(),
                result,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    outcomes.sort_by(|a, b| {
        b.result
            .final_balance
            .total_cmp(&a.result.final_balance)
            .then_with(|| b.result.sharpe_ratio.total_cmp(&a.result.sharpe_ratio))
    });

    if let Some(best) = outcomes.first() {
        info!(
            strategy = %kind,
            evaluated = outcomes.len(),
            best_params = ?best.params,
            best_balance = best.result.final_balance,
            "sweep complete"
        );
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::synthesize_candles;
    use chrono::{TimeZone, Utc};

    #[test]
    fn range_values_inclusive() {
        assert_eq!(
            ParameterRange::new(10.0, 14.0, 2.0).values().unwrap(),
            vec![10.0, 12.0, 14.0]
        );
        assert_eq!(
            ParameterRange::new(1.0, 2.0, 0.5).values().unwrap(),
            vec![1.0, 1.5, 2.0]
        );
    }

    #[test]
    fn range_values_fractional_step_reaches_max() {
        let values = ParameterRange::new(0.1, 0.3, 0.1).values().unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn range_degenerate_cases() {
        assert_eq!(ParameterRange::fixed(7.0).values().unwrap(), vec![7.0]);
        assert_eq!(ParameterRange::new(5.0, 1.0, 1.0).values().unwrap(), vec![5.0]);
        assert_eq!(ParameterRange::new(5.0, 9.0, -1.0).values().unwrap(), vec![5.0]);
    }

    #[test]
    fn range_rejects_unbounded_expansion() {
        let err = ParameterRange::new(1.0, f64::INFINITY, 1.0).values().unwrap_err();
        assert!(matches!(err, TradelabError::ConfigInvalid { ref key, .. } if key == "range"));

        assert!(ParameterRange::new(0.0, 1e12, 1e-9).values().is_err());
        assert!(ParameterRange::new(f64::NAN, 1.0, 1.0).values().is_err());
        assert!(ParameterRange::new(0.0, 1e300, f64::MIN_POSITIVE).values().is_err());

        let values = ParameterRange::new(0.0, (MAX_RANGE_VALUES - 1) as f64, 1.0)
            .values()
            .unwrap();
        assert_eq!(values.len(), MAX_RANGE_VALUES);
    }

    #[test]
    fn range_parse_rejects_non_finite() {
        assert!("1:inf:1".parse::<ParameterRange>().is_err());
        assert!("nan".parse::<ParameterRange>().is_err());
        assert!("-inf:0:1".parse::<ParameterRange>().is_err());
    }

    #[test]
    fn range_parse() {
        assert_eq!(
            "10:20:5".parse::<ParameterRange>().unwrap(),
            ParameterRange::new(10.0, 20.0, 5.0)
        );
        assert_eq!(
            "0.5".parse::<ParameterRange>().unwrap(),
            ParameterRange::fixed(0.5)
        );
        assert!("1:2".parse::<ParameterRange>().is_err());
        assert!("a:b:c".parse::<ParameterRange>().is_err());
    }

    #[test]
    fn grid_is_cartesian_product() {
        let grid = parameter_grid(&[
            ParameterRange::new(1.0, 2.0, 1.0),
            ParameterRange::fixed(30.0),
            ParameterRange::new(60.0, 70.0, 10.0),
        ])
        .unwrap();
        assert_eq!(
            grid,
            vec![
                vec![1.0, 30.0, 60.0],
                vec![1.0, 30.0, 70.0],
                vec![2.0, 30.0, 60.0],
                vec![2.0, 30.0, 70.0],
            ]
        );
    }

    #[test]
    fn grid_of_no_ranges_is_single_empty_vector() {
        assert_eq!(parameter_grid(&[]).unwrap(), vec![Vec::<f64>::new()]);
    }

    #[test]
    fn grid_rejects_oversized_product() {
        let wide = ParameterRange::new(0.0, 999.0, 1.0);
        let err = parameter_grid(&[wide, wide, wide]).unwrap_err();
        assert!(matches!(err, TradelabError::ConfigInvalid { ref reason, .. } if reason.contains("grid")));
    }

    #[test]
    fn sweep_sorts_best_first() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.4).sin())
            .collect();
        let candles = synthesize_candles(&prices, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let grid = parameter_grid(&[
            ParameterRange::new(5.0, 15.0, 5.0),
            ParameterRange::fixed(30.0),
            ParameterRange::fixed(70.0),
        ])
        .unwrap();

        let outcomes = run_sweep(StrategyKind::Rsi, &grid, &candles, &BacktestConfig::default()).unwrap();

        assert_eq!(outcomes.len(), 3);
        for pair in outcomes.windows(2) {
            assert!(pair[0].result.final_balance >= pair[1].result.final_balance);
        }
        let mut seen: Vec<f64> = outcomes.iter().map(|o| o.params[0]).collect();
        seen.sort_by(f64::total_cmp);
        assert_eq!(seen, vec![5.0, 10.0, 15.0]);
    }
}
