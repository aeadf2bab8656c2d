//! Market data access port.

use std::path::Path;

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;

pub trait DataPort {
    /// Load every candle from `source`, sorted by timestamp.
    fn fetch_candles(&self, source: &Path) -> Result<Vec<Candle>, TradelabError>;
}
