//! Technical indicator implementations.
//!
//! Every indicator is a pure transform over a price series and returns one
//! entry per input element. Entries that cannot be computed yet (warm-up, a
//! zero period, or a series too short for the period) are `None` rather than
//! a fabricated zero, so downstream comparisons skip them.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod stddev;

pub use bollinger::{calculate_bollinger, BollingerBand};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::{mean, population_stddev};

/// Number of leading `None` entries, i.e. the observed warm-up length.
pub fn warmup_len(series: &[Option<f64>]) -> usize {
    series.iter().take_while(|v| v.is_none()).count()
}
