//! Open-position state for strategies that track entries and exits.

use crate::domain::trade::Side;

/// At most one open position, carrying its entry price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    /// No open position.
    #[default]
    Flat,
    Long { entry_price: f64 },
    Short { entry_price: f64 },
}

impl PositionState {
    pub fn is_open(&self) -> bool {
        !matches!(self, PositionState::Flat)
    }

    pub fn entry_price(&self) -> Option<f64> {
        match *self {
            PositionState::Flat => None,
            PositionState::Long { entry_price } | PositionState::Short { entry_price } => {
                Some(entry_price)
            }
        }
    }

    /// Side of the trade that closes this position.
    pub fn exit_side(&self) -> Option<Side> {
        match self {
            PositionState::Flat => None,
            PositionState::Long { .. } => Some(Side::Sell),
            PositionState::Short { .. } => Some(Side::Buy),
        }
    }

    /// (price - entry) / entry. `None` when flat or the entry price is zero.
    pub fn price_change(&self, price: f64) -> Option<f64> {
        let entry = self.entry_price()?;
        if entry == 0.0 {
            return None;
        }
        Some((price - entry) / entry)
    }

    /// Adverse move of at least `stop_loss` (a fraction of the entry price).
    pub fn should_stop_loss(&self, price: f64, stop_loss: f64) -> bool {
        match (self, self.price_change(price)) {
            (PositionState::Long { .. }, Some(change)) => change <= -stop_loss,
            (PositionState::Short { .. }, Some(change)) => change >= stop_loss,
            _ => false,
        }
    }

    /// Favorable move of at least `take_profit` (a fraction of the entry price).
    pub fn should_take_profit(&self, price: f64, take_profit: f64) -> bool {
        match (self, self.price_change(price)) {
            (PositionState::Long { .. }, Some(change)) => change >= take_profit,
            (PositionState::Short { .. }, Some(change)) => change <= -take_profit,
            _ => false,
        }
    }
}
