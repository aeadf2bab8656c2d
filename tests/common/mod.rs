#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tradelab::domain::candle::{synthesize_candles, Candle};
use tradelab::domain::error::TradelabError;
use tradelab::domain::trade::{Side, Trade};
use tradelab::ports::data_port::DataPort;

/// In-memory candle source keyed by path.
pub struct MockDataPort {
    pub data: HashMap<PathBuf, Vec<Candle>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, path: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(PathBuf::from(path), candles);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, source: &Path) -> Result<Vec<Candle>, TradelabError> {
        self.data
            .get(source)
            .cloned()
            .ok_or_else(|| TradelabError::Data {
                reason: format!("no data for {}", source.display()),
            })
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn candles_from_closes(prices: &[f64]) -> Vec<Candle> {
    synthesize_candles(prices, epoch())
}

pub fn trade(side: Side, price: f64) -> Trade {
    Trade::unit(side, epoch(), price, "test")
}

/// Flat at 10, rising to 20, flat, then falling back to 10 (30 prices).
pub fn rise_and_pullback() -> Vec<f64> {
    let mut prices = vec![10.0; 5];
    prices.extend((11..=20).map(f64::from));
    prices.extend([20.0; 5]);
    prices.extend((10..=19).rev().map(f64::from));
    prices
}

/// Flat, dip, rally, dip again (23 prices).
pub fn swing() -> Vec<f64> {
    let mut prices = vec![10.0; 6];
    prices.extend([9.0, 8.0, 7.0, 6.0, 5.0]);
    prices.extend([6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
    prices.extend([11.0, 10.0, 9.0, 8.0, 7.0]);
    prices
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// CSV candle file with one flat candle per price, one minute apart.
pub fn write_candle_csv(dir: &Path, name: &str, prices: &[f64]) -> PathBuf {
    let start = epoch().timestamp();
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for (i, price) in prices.iter().enumerate() {
        content.push_str(&format!(
            "{},{p},{p},{p},{p},1000\n",
            start + 60 * i as i64,
            p = price
        ));
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
