use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::SessionSelector;
use crate::models::output::HistoricalContext;

/// Where the historical analog statistics come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoricalStatsSource {
    /// Match analogs from the fetched historical candles
    #[default]
    Computed,
    /// Use precomputed `{similar_conditions_occurrences, expansion_rate}` from a JSON file
    File(PathBuf),
}

/// Every field the analyzer recognises, with defaults spelled out in `new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Pair in any common notation (EUR/USD, eurusd, EUR-USD)
    pub pair: String,
    pub session: SessionSelector,
    /// Overrides the pip size implied by the pair. Ignored unless positive.
    pub pip_size: Option<f64>,
    /// Manually flagged event label; takes precedence over the calendar lookup
    pub event: Option<String>,
    /// Label for when the manual event lands, e.g. "NY" gives "... during NY overlap"
    pub event_overlap: Option<String>,
    pub historical_stats: HistoricalStatsSource,
}

impl AnalysisRequest {
    pub fn new(pair: &str, session: SessionSelector) -> Self {
        Self {
            pair: pair.to_string(),
            session,
            pip_size: None,
            event: None,
            event_overlap: None,
            historical_stats: HistoricalStatsSource::Computed,
        }
    }

    pub fn with_event(mut self, event: &str, overlap: Option<&str>) -> Self {
        self.event = Some(event.to_string());
        self.event_overlap = overlap.map(str::to_string);
        self
    }

    pub fn with_pip_size(mut self, pip_size: f64) -> Self {
        self.pip_size = Some(pip_size);
        self
    }

    pub fn with_historical_stats(mut self, path: PathBuf) -> Self {
        self.historical_stats = HistoricalStatsSource::File(path);
        self
    }

    /// Manual pip size if it is usable.
    pub fn pip_size_override(&self) -> Option<f64> {
        self.pip_size.filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Manual event label, ignoring blanks.
    pub fn manual_event(&self) -> Option<&str> {
        self.event
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Read a stats file off the async runtime.
pub async fn load_historical_stats(path: PathBuf) -> Result<HistoricalContext> {
    tokio::task::spawn_blocking(move || read_historical_stats(&path))
        .await
        .context("Stats read task panicked")?
}

pub fn read_historical_stats(path: &Path) -> Result<HistoricalContext> {
    let file = File::open(path).context(format!("Failed to open stats file: {:?}", path))?;
    let stats: HistoricalContext = serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse stats file: {:?}", path))?;
    if !(0.0..=1.0).contains(&stats.expansion_rate) {
        bail!(
            "expansion_rate {} in {:?} is outside [0, 1]",
            stats.expansion_rate,
            path
        );
    }
    Ok(stats)
}
