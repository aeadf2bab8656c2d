//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) entries are undefined.

use super::stddev::{mean, population_stddev};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBand {
    /// %B: 0 at the lower band, 1 at the upper band. `None` when the band has
    /// zero width.
    pub fn percent_b(&self, price: f64) -> Option<f64> {
        let width = self.upper - self.lower;
        if width == 0.0 {
            return None;
        }
        Some((price - self.lower) / width)
    }
}

pub fn calculate_bollinger(
    series: &[f64],
    period: usize,
    multiplier: f64,
) -> Vec<Option<BollingerBand>> {
    let mut values = vec![None; series.len()];
    if period == 0 || series.len() < period {
        return values;
    }

    for (offset, window) in series.windows(period).enumerate() {
        let (Some(middle), Some(stddev)) = (mean(window), population_stddev(window)) else {
            continue;
        };
        values[offset + period - 1] = Some(BollingerBand {
            upper: middle + multiplier * stddev,
            middle,
            lower: middle - multiplier * stddev,
        });
    }

    values
}
