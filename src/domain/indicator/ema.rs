//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed at index n-1 with the SMA of the first n values, then
//! EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1].
//! Warmup: first (n-1) entries are undefined.

use super::sma::calculate_sma;

pub fn calculate_ema(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; series.len()];
    let Some(seed) = series
        .get(..period)
        .and_then(|head| calculate_sma(head, period))
    else {
        return values;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = seed;
    values[period - 1] = Some(ema);

    for (i, &price) in series.iter().enumerate().skip(period) {
        ema = (price - ema) * k + ema;
        values[i] = Some(ema);
    }

    values
}

/// EMA over the first contiguous run of defined entries in `series`.
///
/// Entries before the run, inside the EMA's own warm-up, or after the run
/// ends are undefined.
pub(crate) fn calculate_ema_defined(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; series.len()];
    let Some(start) = series.iter().position(Option::is_some) else {
        return values;
    };

    let run: Vec<f64> = series[start..].iter().map_while(|v| *v).collect();
    for (offset, v) in calculate_ema(&run, period).into_iter().enumerate() {
        values[start + offset] = v;
    }
    values
}
