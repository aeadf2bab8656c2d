//! Safe host-facing wrapper around a single strategy instance.
//!
//! A host hands over a bare price list; the handle turns it into flat candles,
//! runs the strategy and reports only the most recent decision. The signal
//! types are `#[repr(C)]` so [`crate::ffi`] can pass them across the C ABI
//! unchanged.

use chrono::{DateTime, Utc};

use crate::domain::candle::synthesize_candles;
use crate::domain::strategy::{create_strategy, Strategy, StrategyKind};
use crate::domain::trade::{Side, Trade};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSide {
    Buy = 0,
    Sell = 1,
}

impl From<Side> for SignalSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => SignalSide::Buy,
            Side::Sell => SignalSide::Sell,
        }
    }
}

/// Most recent trade of an analysis, in a layout stable across the C ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSignal {
    pub side: SignalSide,
    pub price: f64,
    pub amount: f64,
    /// Unix seconds.
    pub timestamp: i64,
}

impl From<&Trade> for TradeSignal {
    fn from(trade: &Trade) -> Self {
        Self {
            side: trade.side.into(),
            price: trade.price,
            amount: trade.amount,
            timestamp: trade.timestamp.timestamp(),
        }
    }
}

pub struct StrategyHandle {
    strategy: Box<dyn Strategy>,
}

impl StrategyHandle {
    pub fn new(kind: StrategyKind, params: &[f64]) -> Self {
        Self {
            strategy: create_strategy(kind, params),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn parameters(&self) -> Vec<f64> {
        self.strategy.parameters()
    }

    pub fn update_parameters(&mut self, params: &[f64]) {
        self.strategy.update_parameters(params);
    }

    /// Run the strategy over one flat candle per price, the last one stamped
    /// a minute before `now`, and return the final trade if any.
    pub fn analyze_prices(&mut self, prices: &[f64], now: DateTime<Utc>) -> Option<TradeSignal> {
        let candles = synthesize_candles(prices, now);
        self.strategy
            .analyze(&candles)
            .last()
            .map(TradeSignal::from)
    }
}
