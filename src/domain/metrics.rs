//! Performance statistics over a trade sequence.
//!
//! No annualization and no risk-free adjustment: the Sharpe ratio here is the
//! mean of per-trade synthetic cash flows over their population standard
//! deviation.

use crate::domain::indicator::{mean, population_stddev};
use crate::domain::trade::Trade;

/// Fractional decline from `peak`. Zero for a non-positive peak.
pub fn drawdown(peak: f64, balance: f64) -> f64 {
    if peak > 0.0 {
        (peak - balance) / peak
    } else {
        0.0
    }
}

/// Signed cash flow per trade: +notional×(1−commission) for Sell, negated for
/// Buy.
pub fn trade_returns(trades: &[Trade], commission: f64) -> Vec<f64> {
    trades
        .iter()
        .map(|t| t.side.cash_sign() * t.notional() * (1.0 - commission))
        .collect()
}

/// Spread below this fraction of the largest absolute return is rounding
/// noise, not variation.
const SPREAD_TOLERANCE: f64 = 1e-9;

/// mean / population stddev of [`trade_returns`]. Zero when there are no
/// trades or the returns do not vary.
pub fn sharpe_ratio(trades: &[Trade], commission: f64) -> f64 {
    let returns = trade_returns(trades, commission);
    let scale = returns.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
    match (mean(&returns), population_stddev(&returns)) {
        (Some(mean), Some(stddev)) if stddev > scale * SPREAD_TOLERANCE => mean / stddev,
        _ => 0.0,
    }
}

/// wins / trades, or zero without trades.
pub fn win_rate(wins: usize, trades: usize) -> f64 {
    if trades > 0 {
        wins as f64 / trades as f64
    } else {
        0.0
    }
}
