//! Collaborator seams for market data and feature snapshots, plus thin
//! file-backed adapters. Live retrieval from third-party providers happens
//! outside this crate; an upstream pipeline drops candle CSVs and snapshot
//! JSONs into the data directory and the adapters read them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SignalBotError;
use crate::models::{Candle, FeatureSnapshot};

/// Price-window source for lifecycle tracking. Implementations are expected
/// to be bounded calls; the tracker additionally wraps each call in a
/// timeout.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candles for `symbol` from `since` to now, ascending by time
    async fn price_window(&self, symbol: &str, since: DateTime<Utc>)
        -> crate::Result<Vec<Candle>>;
}

/// Per-instrument indicator snapshots for classification
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn snapshot(&self, symbol: &str) -> crate::Result<FeatureSnapshot>;

    /// Higher-timeframe snapshot used for trend confirmation; `None` when
    /// the instrument has no confirmation timeframe
    async fn confirmation_snapshot(&self, symbol: &str)
        -> crate::Result<Option<FeatureSnapshot>>;
}

/// Symbols carry exchange punctuation (`GC=F`, `^NSEI`, `M&M.NS`); keep
/// file names boring.
fn sanitize(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads cached candles from `<dir>/<symbol>.csv` with the header
/// `timestamp,open,high,low,close,volume` (RFC 3339 timestamps).
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sanitize(symbol)))
    }
}

#[async_trait]
impl MarketDataProvider for CsvPriceProvider {
    async fn price_window(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> crate::Result<Vec<Candle>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(SignalBotError::DataUnavailable(symbol.to_string()).into());
        }

        let mut reader = csv::Reader::from_path(&path).map_err(SignalBotError::from)?;
        let mut candles = Vec::new();
        for row in reader.deserialize() {
            let row: CandleRow = row.map_err(SignalBotError::from)?;
            if row.timestamp < since {
                continue;
            }
            candles.push(Candle {
                symbol: symbol.to_string(),
                timestamp: row.timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

/// Reads feature snapshots from `<dir>/<symbol>.json`, with the optional
/// confirmation timeframe at `<dir>/<symbol>.confirm.json`.
pub struct JsonFeatureSource {
    dir: PathBuf,
}

impl JsonFeatureSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_snapshot(path: &Path) -> crate::Result<FeatureSnapshot> {
        let raw = std::fs::read_to_string(path).map_err(SignalBotError::from)?;
        Ok(serde_json::from_str(&raw).map_err(SignalBotError::from)?)
    }
}

#[async_trait]
impl FeatureSource for JsonFeatureSource {
    async fn snapshot(&self, symbol: &str) -> crate::Result<FeatureSnapshot> {
        let path = self.dir.join(format!("{}.json", sanitize(symbol)));
        if !path.exists() {
            return Err(SignalBotError::DataUnavailable(symbol.to_string()).into());
        }
        Self::read_snapshot(&path)
    }

    async fn confirmation_snapshot(
        &self,
        symbol: &str,
    ) -> crate::Result<Option<FeatureSnapshot>> {
        let path = self.dir.join(format!("{}.confirm.json", sanitize(symbol)));
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_snapshot(&path)?))
    }
}
