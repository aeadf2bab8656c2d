//! OHLCV candle representation.

use chrono::{DateTime, Duration, Utc};

/// Volume assigned to candles synthesized from a bare price list.
pub const SYNTHETIC_VOLUME: f64 = 1000.0;

/// Spacing between synthesized candles, in seconds.
pub const SYNTHETIC_INTERVAL_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A candle whose open, high, low and close all equal `price`.
    pub fn flat(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// Closing prices of `candles`, in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// One flat candle per price, spaced one minute apart and ending one minute
/// before `now`: candle `i` is stamped `now - (len - i) * 60s`.
pub fn synthesize_candles(prices: &[f64], now: DateTime<Utc>) -> Vec<Candle> {
    let len = prices.len() as i64;
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let offset = (len - i as i64) * SYNTHETIC_INTERVAL_SECS;
            Candle::flat(now - Duration::seconds(offset), price, SYNTHETIC_VOLUME)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn flat_candle_fields() {
        let c = Candle::flat(now(), 42.5, 10.0);
        assert_eq!(c.open, 42.5);
        assert_eq!(c.high, 42.5);
        assert_eq!(c.low, 42.5);
        assert_eq!(c.close, 42.5);
        assert_eq!(c.volume, 10.0);
    }

    #[test]
    fn synthesize_spacing_and_volume() {
        let candles = synthesize_candles(&[1.0, 2.0, 3.0], now());
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp, now() - Duration::seconds(180));
        assert_eq!(candles[1].timestamp, now() - Duration::seconds(120));
        assert_eq!(candles[2].timestamp, now() - Duration::seconds(60));
        assert!(candles.iter().all(|c| c.volume == SYNTHETIC_VOLUME));
        assert_eq!(closes(&candles), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn synthesize_empty() {
        assert!(synthesize_candles(&[], now()).is_empty());
    }
}
