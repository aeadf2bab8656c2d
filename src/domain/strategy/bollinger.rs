//! Bollinger %B band-touch strategy.
//!
//! Level-triggered: every index from `period` on is re-evaluated on its own.
//! Buy while %B is below the threshold and price is still above the lower
//! band; Sell while %B is above `1 - threshold` and price is still below the
//! upper band. A zero-width band produces no signal.
//!
//! Parameters: `[period, multiplier, threshold]`, defaults `[20, 2.0, 0.5]`.

use tracing::debug;

use super::{as_period, leading_params, Strategy, StrategyKind};
use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::bollinger::{DEFAULT_MULTIPLIER, DEFAULT_PERIOD};
use crate::domain::indicator::calculate_bollinger;
use crate::domain::trade::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBandsStrategy {
    pub period: usize,
    pub multiplier: f64,
    /// %B level below which the price counts as oversold.
    pub threshold: f64,
}

impl Default for BollingerBandsStrategy {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            multiplier: DEFAULT_MULTIPLIER,
            threshold: 0.5,
        }
    }
}

impl Strategy for BollingerBandsStrategy {
    fn name(&self) -> &str {
        "Bollinger Bands Strategy"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerBands
    }

    fn analyze(&mut self, candles: &[Candle]) -> Vec<Trade> {
        let bands = calculate_bollinger(&closes(candles), self.period, self.multiplier);
        let mut trades = Vec::new();

        for (candle, band) in candles.iter().zip(&bands).skip(self.period) {
            let Some(band) = band else {
                continue;
            };
            let price = candle.close;
            let Some(percent_b) = band.percent_b(price) else {
                continue;
            };

            if percent_b < self.threshold && price > band.lower {
                trades.push(Trade::unit(
                    Side::Buy,
                    candle.timestamp,
                    price,
                    "BB Oversold",
                ));
            } else if percent_b > 1.0 - self.threshold && price < band.upper {
                trades.push(Trade::unit(
                    Side::Sell,
                    candle.timestamp,
                    price,
                    "BB Overbought",
                ));
            }
        }

        trades
    }

    fn update_parameters(&mut self, params: &[f64]) {
        let Some([period, multiplier, threshold]) = leading_params::<3>(self.name(), params) else {
            return;
        };
        self.period = as_period(period);
        self.multiplier = multiplier;
        self.threshold = threshold;
        debug!(
            period = self.period,
            multiplier, threshold, "Bollinger parameters updated"
        );
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.period as f64, self.multiplier, self.threshold]
    }

    fn min_candles(&self) -> usize {
        self.period.saturating_add(1)
    }
}
