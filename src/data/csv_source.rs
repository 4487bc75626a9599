use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::candle_csv_filename;
use crate::data::candle_source::{CandleInterval, CandleRequest, CandleSource};
use crate::domain::Candle;
use crate::models::CandleSeries;
use crate::utils::TimeUtils;

/// One row of a candle export: `timestamp,open,high,low,close[,volume]`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Parse one candle CSV file into an ordered series.
pub fn read_candle_csv(path: &Path) -> Result<CandleSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open candle file: {:?}", path))?;

    let mut candles = Vec::new();
    for (row, result) in reader.deserialize::<CsvRecord>().enumerate() {
        // Header is line 1
        let line = row + 2;
        let record = result.context(format!("Bad candle row at {:?}:{}", path, line))?;
        let timestamp = TimeUtils::parse_utc_timestamp(&record.timestamp)
            .context(format!("Bad timestamp at {:?}:{}", path, line))?;
        candles.push(Candle::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Read {} candles from {:?}", candles.len(), path);
    }

    Ok(CandleSeries::new(candles))
}

/// Candles from a directory of `{PAIR}_{interval}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    directory: PathBuf,
}

impl CsvCandleSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, pair: &str, interval: CandleInterval) -> PathBuf {
        self.directory
            .join(candle_csv_filename(pair, &interval.label()))
    }
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        let path = self.path_for(&request.pair, request.interval);
        let series = tokio::task::spawn_blocking(move || read_candle_csv(&path))
            .await
            .context("CSV read task panicked")??;
        Ok(request.span.apply(&series))
    }

    fn signature(&self) -> &'static str {
        "CSV directory"
    }
}
