//! RSI threshold-cross strategy.
//!
//! Sell when RSI crosses down through the overbought level, Buy when it
//! crosses up through the oversold level. Every crossing emits a trade.
//!
//! Parameters: `[period, oversold, overbought]`, defaults `[14, 30, 70]`.

use tracing::debug;

use super::{as_period, leading_params, Strategy, StrategyKind};
use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::calculate_rsi;
use crate::domain::trade::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct RsiStrategy {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        "RSI Strategy"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Rsi
    }

    fn analyze(&mut self, candles: &[Candle]) -> Vec<Trade> {
        let rsi = calculate_rsi(&closes(candles), self.period);
        let mut trades = Vec::new();

        for i in self.period.saturating_add(1)..candles.len() {
            let (Some(prev), Some(curr)) = (rsi[i - 1], rsi[i]) else {
                continue;
            };
            let candle = &candles[i];

            if prev > self.overbought && curr <= self.overbought {
                trades.push(Trade::unit(
                    Side::Sell,
                    candle.timestamp,
                    candle.close,
                    "RSI Overbought",
                ));
            } else if prev < self.oversold && curr >= self.oversold {
                trades.push(Trade::unit(
                    Side::Buy,
                    candle.timestamp,
                    candle.close,
                    "RSI Oversold",
                ));
            }
        }

        trades
    }

    fn update_parameters(&mut self, params: &[f64]) {
        let Some([period, oversold, overbought]) = leading_params::<3>(self.name(), params) else {
            return;
        };
        self.period = as_period(period);
        self.oversold = oversold;
        self.overbought = overbought;
        debug!(period = self.period, oversold, overbought, "RSI parameters updated");
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.period as f64, self.oversold, self.overbought]
    }

    fn min_candles(&self) -> usize {
        self.period.saturating_add(2)
    }
}
