//! Simple Moving Average.
//!
//! SMA(n) = mean of the last n values. Used as a tail query and as the EMA
//! seed.

/// Mean of the last `period` values of `series`, or `None` when the series is
/// shorter than `period` or `period` is zero.
pub fn calculate_sma(series: &[f64], period: usize) -> Option<f64> {
    if period == 0 || series.len() < period {
        return None;
    }
    let tail = &series[series.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}
