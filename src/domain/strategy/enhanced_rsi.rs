//! RSI strategy with an EMA trend filter, explicit position state and
//! stop-loss / take-profit exits.
//!
//! Per step, while a position is open only the exits are checked; an exit
//! returns the state to flat and ends the step. When flat:
//! - close above EMA and RSI at or below oversold: Buy, open Long
//! - close at or below EMA and RSI at or above overbought: Sell, open Short
//!
//! The state starts flat on every `analyze` call; the state reached at the
//! end of the call stays readable through [`EnhancedRsiStrategy::position`].
//!
//! Parameters: `[rsi_period, ema_period, oversold, overbought, stop_loss,
//! take_profit]`, defaults `[14, 20, 30, 70, 0.02, 0.04]`. Stop loss and take
//! profit are fractions of the entry price.

use tracing::debug;

use super::{as_period, leading_params, Strategy, StrategyKind};
use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::{calculate_ema, calculate_rsi};
use crate::domain::position::PositionState;
use crate::domain::trade::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedRsiStrategy {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    position: PositionState,
}

impl Default for EnhancedRsiStrategy {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_period: 20,
            oversold: 30.0,
            overbought: 70.0,
            stop_loss: 0.02,
            take_profit: 0.04,
            position: PositionState::Flat,
        }
    }
}

impl EnhancedRsiStrategy {
    /// Position left open at the end of the last `analyze` call.
    pub fn position(&self) -> PositionState {
        self.position
    }

    fn exit_reason(&self, price: f64) -> Option<&'static str> {
        if self.position.should_stop_loss(price, self.stop_loss) {
            Some("Stop Loss")
        } else if self.position.should_take_profit(price, self.take_profit) {
            Some("Take Profit")
        } else {
            None
        }
    }
}

impl Strategy for EnhancedRsiStrategy {
    fn name(&self) -> &str {
        "Enhanced RSI Strategy"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::EnhancedRsi
    }

    fn analyze(&mut self, candles: &[Candle]) -> Vec<Trade> {
        let prices = closes(candles);
        let rsi = calculate_rsi(&prices, self.rsi_period);
        let ema = calculate_ema(&prices, self.ema_period);
        let mut trades = Vec::new();
        self.position = PositionState::Flat;

        for i in self.ema_period..candles.len() {
            let candle = &candles[i];
            let price = candle.close;

            if let Some(exit_side) = self.position.exit_side() {
                if let Some(reason) = self.exit_reason(price) {
                    trades.push(Trade::unit(exit_side, candle.timestamp, price, reason));
                    self.position = PositionState::Flat;
                }
                continue;
            }

            let (Some(rsi), Some(ema)) = (rsi[i], ema[i]) else {
                continue;
            };

            if price > ema && rsi <= self.oversold {
                trades.push(Trade::unit(
                    Side::Buy,
                    candle.timestamp,
                    price,
                    "RSI Oversold + EMA Support",
                ));
                self.position = PositionState::Long { entry_price: price };
            } else if price <= ema && rsi >= self.overbought {
                trades.push(Trade::unit(
                    Side::Sell,
                    candle.timestamp,
                    price,
                    "RSI Overbought + EMA Resistance",
                ));
                self.position = PositionState::Short { entry_price: price };
            }
        }

        trades
    }

    fn update_parameters(&mut self, params: &[f64]) {
        let Some([rsi_period, ema_period, oversold, overbought, stop_loss, take_profit]) =
            leading_params::<6>(self.name(), params)
        else {
            return;
        };
        self.rsi_period = as_period(rsi_period);
        self.ema_period = as_period(ema_period);
        self.oversold = oversold;
        self.overbought = overbought;
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        debug!(
            rsi_period = self.rsi_period,
            ema_period = self.ema_period,
            oversold,
            overbought,
            stop_loss,
            take_profit,
            "Enhanced RSI parameters updated"
        );
    }

    fn parameters(&self) -> Vec<f64> {
        vec![
            self.rsi_period as f64,
            self.ema_period as f64,
            self.oversold,
            self.overbought,
            self.stop_loss,
            self.take_profit,
        ]
    }

    fn min_candles(&self) -> usize {
        self.ema_period.max(self.rsi_period).saturating_add(1)
    }
}
