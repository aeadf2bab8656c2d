//! Strategy abstraction, kind tags and the strategy factory.
//!
//! A strategy turns a candle sequence into an ordered list of trade
//! decisions. Parameters are updated from a positional numeric vector whose
//! layout is specific to each variant; a vector shorter than the variant needs
//! is ignored as a whole.
//!
//! `analyze` and `update_parameters` take `&mut self`, so one instance can
//! only be driven by one caller at a time. Distinct instances share nothing
//! and can run on separate threads.

pub mod bollinger;
pub mod enhanced_rsi;
pub mod macd;
pub mod rsi;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::domain::trade::Trade;

pub use bollinger::BollingerBandsStrategy;
pub use enhanced_rsi::EnhancedRsiStrategy;
pub use macd::MacdStrategy;
pub use rsi::RsiStrategy;

pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// Evaluate the whole candle sequence and return the emitted trades in
    /// candle order.
    fn analyze(&mut self, candles: &[Candle]) -> Vec<Trade>;

    /// Replace all parameters from `params`. Shorter than
    /// [`StrategyKind::required_params`] is a no-op.
    fn update_parameters(&mut self, params: &[f64]);

    /// Current parameters, in the same order `update_parameters` reads them.
    fn parameters(&self) -> Vec<f64>;

    /// Fewest candles for which `analyze` can emit a trade.
    fn min_candles(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Rsi,
    Macd,
    BollingerBands,
    EnhancedRsi,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::BollingerBands,
        StrategyKind::EnhancedRsi,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::BollingerBands => "bbands",
            StrategyKind::EnhancedRsi => "enhanced_rsi",
        }
    }

    /// Length of the positional parameter vector.
    pub fn required_params(self) -> usize {
        match self {
            StrategyKind::Rsi => 3,
            StrategyKind::Macd => 4,
            StrategyKind::BollingerBands => 3,
            StrategyKind::EnhancedRsi => 6,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for StrategyKind {
    type Err = TradelabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Ok(StrategyKind::Rsi),
            "macd" => Ok(StrategyKind::Macd),
            "bbands" | "bollinger" | "bollinger_bands" => Ok(StrategyKind::BollingerBands),
            "enhanced_rsi" | "enhanced-rsi" => Ok(StrategyKind::EnhancedRsi),
            _ => Err(TradelabError::UnknownStrategy { tag: s.to_string() }),
        }
    }
}

/// Build a strategy of `kind` with its defaults, then apply `params`.
pub fn create_strategy(kind: StrategyKind, params: &[f64]) -> Box<dyn Strategy> {
    let mut strategy: Box<dyn Strategy> = match kind {
        StrategyKind::Rsi => Box::new(RsiStrategy::default()),
        StrategyKind::Macd => Box::new(MacdStrategy::default()),
        StrategyKind::BollingerBands => Box::new(BollingerBandsStrategy::default()),
        StrategyKind::EnhancedRsi => Box::new(EnhancedRsiStrategy::default()),
    };
    strategy.update_parameters(params);
    strategy
}

/// The first `N` values of `params`, or `None` (with a debug log) when fewer
/// are supplied.
pub(crate) fn leading_params<const N: usize>(name: &str, params: &[f64]) -> Option<[f64; N]> {
    match params.get(..N).and_then(|head| <[f64; N]>::try_from(head).ok()) {
        Some(head) => Some(head),
        None => {
            debug!(
                strategy = name,
                expected = N,
                got = params.len(),
                "ignoring short parameter vector"
            );
            None
        }
    }
}

/// Truncate a parameter to a period. Negative and NaN map to 0.
pub(crate) fn as_period(value: f64) -> usize {
    value as usize
}
