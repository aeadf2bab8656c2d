//! Trade decision records emitted by strategies.

use chrono::{DateTime, Utc};
use std::fmt;

/// Fixed position size used for every emitted trade.
pub const UNIT_AMOUNT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for Sell (cash in), -1 for Buy (cash out).
    pub fn cash_sign(self) -> f64 {
        match self {
            Side::Buy => -1.0,
            Side::Sell => 1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.pad("BUY"),
            Side::Sell => f.pad("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: Side,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub amount: f64,
    /// Free-text classification for diagnostics.
    pub reason: String,
}

impl Trade {
    /// A unit-sized trade at `price`.
    pub fn unit(side: Side, timestamp: DateTime<Utc>, price: f64, reason: &str) -> Self {
        Self {
            side,
            timestamp,
            price,
            amount: UNIT_AMOUNT,
            reason: reason.to_string(),
        }
    }

    /// price * amount
    pub fn notional(&self) -> f64 {
        self.price * self.amount
    }
}
