//! MACD histogram-cross strategy.
//!
//! Buy when the histogram rises through `+threshold`, Sell when it falls
//! through `-threshold`. Undefined histogram entries are skipped.
//!
//! Parameters: `[fast, slow, signal, threshold]`, defaults `[12, 26, 9, 0.0]`.

use tracing::debug;

use super::{as_period, leading_params, Strategy, StrategyKind};
use crate::domain::candle::{closes, Candle};
use crate::domain::indicator::calculate_macd;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::trade::{Side, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct MacdStrategy {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub threshold: f64,
}

impl Default for MacdStrategy {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
            threshold: 0.0,
        }
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> &str {
        "MACD Strategy"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Macd
    }

    fn analyze(&mut self, candles: &[Candle]) -> Vec<Trade> {
        let histogram = calculate_macd(&closes(candles), self.fast, self.slow, self.signal).histogram;
        let threshold = self.threshold;
        let mut trades = Vec::new();

        for i in self.signal.saturating_add(1)..candles.len() {
            let (Some(prev), Some(curr)) = (histogram[i - 1], histogram[i]) else {
                continue;
            };
            let candle = &candles[i];

            if prev <= threshold && curr > threshold {
                trades.push(Trade::unit(
                    Side::Buy,
                    candle.timestamp,
                    candle.close,
                    "MACD Bullish Crossover",
                ));
            } else if prev >= -threshold && curr < -threshold {
                trades.push(Trade::unit(
                    Side::Sell,
                    candle.timestamp,
                    candle.close,
                    "MACD Bearish Crossover",
                ));
            }
        }

        trades
    }

    fn update_parameters(&mut self, params: &[f64]) {
        let Some([fast, slow, signal, threshold]) = leading_params::<4>(self.name(), params) else {
            return;
        };
        self.fast = as_period(fast);
        self.slow = as_period(slow);
        self.signal = as_period(signal);
        self.threshold = threshold;
        debug!(
            fast = self.fast,
            slow = self.slow,
            signal = self.signal,
            threshold,
            "MACD parameters updated"
        );
    }

    fn parameters(&self) -> Vec<f64> {
        vec![
            self.fast as f64,
            self.slow as f64,
            self.signal as f64,
            self.threshold,
        ]
    }

    fn min_candles(&self) -> usize {
        // two defined histogram entries
        let line_warmup = self.fast.max(self.slow).saturating_sub(1);
        line_warmup
            .saturating_add(self.signal.saturating_sub(1))
            .saturating_add(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::synthesize_candles;
    use chrono::{TimeZone, Utc};

    fn candles(prices: &[f64]) -> Vec<Candle> {
        synthesize_candles(prices, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    /// Flat, dip, rally, dip again.
    fn swing() -> Vec<f64> {
        let mut prices = vec![10.0; 6];
        prices.extend([9.0, 8.0, 7.0, 6.0, 5.0]);
        prices.extend([6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        prices.extend([11.0, 10.0, 9.0, 8.0, 7.0]);
        prices
    }

    fn fast_macd() -> MacdStrategy {
        let mut strategy = MacdStrategy::default();
        strategy.update_parameters(&[3.0, 6.0, 3.0, 0.0]);
        strategy
    }

    #[test]
    fn bullish_then_bearish_crossover() {
        let candles = candles(&swing());
        let trades = fast_macd().analyze(&candles);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, Side::Buy);
        assert_eq!(trades[0].reason, "MACD Bullish Crossover");
        assert_eq!(trades[0].timestamp, candles[11].timestamp);
        assert_eq!(trades[1].side, Side::Sell);
        assert_eq!(trades[1].reason, "MACD Bearish Crossover");
        assert_eq!(trades[1].timestamp, candles[18].timestamp);
    }

    #[test]
    fn repeated_bullish_crossings_are_not_deduplicated() {
        // dip, rally, stall, rally: the histogram re-crosses +0.1 without
        // ever reaching -0.1
        let mut prices = vec![10.0; 6];
        prices.extend([9.0, 8.0, 7.0, 6.0, 5.0, 6.0, 7.0, 8.0, 8.0, 8.0, 8.0, 9.0, 10.0, 11.0]);
        let mut strategy = fast_macd();
        strategy.threshold = 0.1;
        let candles = candles(&prices);

        let trades = strategy.analyze(&candles);

        let sides: Vec<Side> = trades.iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Buy]);
        assert_eq!(trades[0].timestamp, candles[12].timestamp);
        assert_eq!(trades[0].price, 7.0);
        assert_eq!(trades[1].timestamp, candles[17].timestamp);
        assert_eq!(trades[1].price, 9.0);
    }

    #[test]
    fn wide_threshold_suppresses_crossings() {
        let mut strategy = fast_macd();
        strategy.threshold = 1.0;
        assert!(strategy.analyze(&candles(&swing())).is_empty());
    }

    #[test]
    fn default_periods_need_long_history() {
        let trades = MacdStrategy::default().analyze(&candles(&swing()));
        assert!(trades.is_empty());
    }

    #[test]
    fn update_parameters_short_vector_is_noop() {
        let mut strategy = MacdStrategy::default();
        strategy.update_parameters(&[3.0, 6.0, 3.0]);
        assert_eq!(strategy, MacdStrategy::default());
    }

    #[test]
    fn parameters_roundtrip() {
        assert_eq!(fast_macd().parameters(), vec![3.0, 6.0, 3.0, 0.0]);
    }

    #[test]
    fn min_candles_default() {
        assert_eq!(MacdStrategy::default().min_candles(), 25 + 8 + 2);
    }
}
