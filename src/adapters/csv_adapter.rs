//! CSV candle file adapter.
//!
//! Expects a header row followed by `timestamp,open,high,low,close,volume`
//! records. `timestamp` is either Unix seconds or an RFC 3339 string.

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Parse candles from CSV text. Rows keep their file order.
    pub fn parse(content: &str) -> Result<Vec<Candle>, TradelabError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| TradelabError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            let line = row + 2;

            let timestamp = parse_timestamp(column(&record, 0, "timestamp", line)?, line)?;
            candles.push(Candle {
                timestamp,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        Ok(candles)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, source: &Path) -> Result<Vec<Candle>, TradelabError> {
        let content = fs::read_to_string(source).map_err(|e| TradelabError::Data {
            reason: format!("failed to read {}: {}", source.display(), e),
        })?;

        let mut candles = Self::parse(&content)?;
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, TradelabError> {
    record.get(index).ok_or_else(|| TradelabError::Data {
        reason: format!("line {}: missing {} column", line, name),
    })
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<f64, TradelabError> {
    column(record, index, name, line)?
        .parse()
        .map_err(|e| TradelabError::Data {
            reason: format!("line {}: invalid {} value: {}", line, name, e),
        })
}

fn parse_timestamp(value: &str, line: usize) -> Result<DateTime<Utc>, TradelabError> {
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| TradelabError::Data {
            reason: format!("line {}: timestamp {} out of range", line, secs),
        });
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TradelabError::Data {
            reason: format!("line {}: invalid timestamp '{}': {}", line, value, e),
        })
}
