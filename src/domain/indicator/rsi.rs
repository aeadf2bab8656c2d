//! RSI (Relative Strength Index) indicator.
//!
//! Gains and losses are taken over consecutive differences. The first
//! averages are the plain mean of the first n gains/losses; from price index n
//! onward each average is Wilder-smoothed with the difference ending at that
//! index: avg = (prev_avg * (n-1) + current) / n.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / max(avg_loss, 1e-10)))
//!
//! Warmup: first n entries are undefined. A series of n or fewer prices has
//! no defined entry at all.

/// Floor applied to the average loss before division.
pub const AVG_LOSS_FLOOR: f64 = 1e-10;

pub fn calculate_rsi(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; series.len()];
    if period == 0 || series.len() <= period {
        return values;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = series
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let n = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / n;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / n;

    for i in period..series.len() {
        avg_gain = (avg_gain * (n - 1.0) + gains[i - 1]) / n;
        avg_loss = (avg_loss * (n - 1.0) + losses[i - 1]) / n;
        values[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    values
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss.max(AVG_LOSS_FLOOR);
    100.0 - (100.0 / (1.0 + rs))
}
