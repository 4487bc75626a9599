use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::{PERSISTENCE, snapshot_filename};
use crate::data::candle_source::{CandleInterval, CandleRequest, CandleSource};
use crate::domain::Candle;
use crate::models::CandleSeries;

/// Candles for one pair within a snapshot
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PairCandles {
    pub pair: String,
    pub series: CandleSeries,
}

/// Serialized bundle of candle series sharing one interval.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SnapshotFile {
    pub version: f64,
    pub timestamp_ms: i64,
    pub interval: CandleInterval,
    pub pairs: Vec<PairCandles>,
}

impl SnapshotFile {
    pub fn new(interval: CandleInterval, pairs: Vec<PairCandles>, version: f64) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            interval,
            pairs,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open snapshot file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let snapshot = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize snapshot: {:?}", path))?;
        Ok(snapshot)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize snapshot to: {}", path.display()))
    }

    pub fn default_path(interval: CandleInterval) -> PathBuf {
        PathBuf::from(PERSISTENCE.snapshot.directory).join(snapshot_filename(&interval.label()))
    }
}

/// Serves candles from a snapshot loaded once at construction.
#[derive(Debug, Clone)]
pub struct SnapshotCandleSource {
    interval: CandleInterval,
    series: HashMap<String, CandleSeries>,
}

impl SnapshotCandleSource {
    pub fn from_snapshot(snapshot: SnapshotFile) -> Self {
        let series = snapshot
            .pairs
            .into_iter()
            .map(|p| (p.pair, CandleSeries::new(p.series.into_inner())))
            .collect();
        Self {
            interval: snapshot.interval,
            series,
        }
    }

    /// Load and check the snapshot format version.
    pub fn open(path: &Path, version_required: f64) -> Result<Self> {
        #[cfg(debug_assertions)]
        let start_time = DEBUG_FLAGS.print_serde.then(|| {
            log::info!("Reading snapshot from: {:?}...", path);
            std::time::Instant::now()
        });

        let snapshot = SnapshotFile::load_from_path(path)?;
        if snapshot.version != version_required {
            bail!(
                "Snapshot version mismatch: file v{} vs required v{}",
                snapshot.version,
                version_required
            );
        }

        #[cfg(debug_assertions)]
        if let Some(start) = start_time {
            log::info!(
                "Snapshot loaded: {} pairs in {:.2}s",
                snapshot.pairs.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Ok(Self::from_snapshot(snapshot))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

#[async_trait]
impl CandleSource for SnapshotCandleSource {
    async fn fetch(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        if request.interval != self.interval {
            bail!(
                "Snapshot holds {} candles, {} requested",
                self.interval,
                request.interval
            );
        }
        let series = self
            .series
            .get(&request.pair)
            .ok_or_else(|| anyhow!("Snapshot has no candles for {}", request.pair))?;
        Ok(request.span.apply(series))
    }

    fn signature(&self) -> &'static str {
        "Local Snapshot"
    }
}
