#![allow(clippy::collapsible_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use domain::{Candle, Pair, SessionSelector, TradingSession};
pub use engine::{SessionAnalysis, SessionAnalyzer};
pub use error::AnalysisError;
pub use models::{AnalysisOutput, AnalysisRequest, VolatilityExpectation};

use std::path::PathBuf;

// CLI argument parsing
use clap::Parser;

use crate::config::CANDLE_PATH;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Session volatility expectations for FX pairs", long_about = None)]
pub struct Cli {
    /// Pairs to analyse, e.g. EUR/USD GBPJPY
    #[arg(required = true)]
    pub pairs: Vec<String>,

    /// asian, london, ny or auto
    #[arg(long, short, default_value = "auto")]
    pub session: String,

    /// Directory of {PAIR}_{interval}.csv candle files
    #[arg(long, default_value = CANDLE_PATH)]
    pub candle_dir: PathBuf,

    /// Bincode candle snapshot, tried before the CSV directory
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// JSON economic calendar file
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Manually flag a high-impact event, e.g. "ECB"
    #[arg(long)]
    pub event: Option<String>,

    /// Session overlap the manual event falls in, e.g. "NY"
    #[arg(long, requires = "event")]
    pub event_overlap: Option<String>,

    /// Precomputed {similar_conditions_occurrences, expansion_rate} JSON
    #[arg(long)]
    pub historical_stats: Option<PathBuf>,

    /// Override the pair's pip size
    #[arg(long)]
    pub pip_size: Option<f64>,

    /// Write results to files instead of stdout
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Output file (single pair only); implies --save
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Include diagnostics alongside each result
    #[arg(long, default_value_t = false)]
    pub detailed: bool,
}

impl Cli {
    pub fn session_selector(&self) -> Result<SessionSelector, AnalysisError> {
        self.session.parse()
    }

    /// Request for one pair carrying every optional flag.
    pub fn request_for(&self, pair: &str) -> Result<AnalysisRequest, AnalysisError> {
        let mut request = AnalysisRequest::new(pair, self.session_selector()?);
        if let Some(event) = &self.event {
            request = request.with_event(event, self.event_overlap.as_deref());
        }
        if let Some(pip_size) = self.pip_size {
            request = request.with_pip_size(pip_size);
        }
        if let Some(path) = &self.historical_stats {
            request = request.with_historical_stats(path.clone());
        }
        Ok(request)
    }

    pub fn should_save(&self) -> bool {
        self.save || self.out.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoricalStatsSource;

    #[test]
    fn request_carries_flags() {
        let cli = Cli::try_parse_from([
            "session-sniper",
            "EUR/USD",
            "--session",
            "london",
            "--event",
            "ECB",
            "--event-overlap",
            "NY",
            "--pip-size",
            "0.0001",
            "--historical-stats",
            "stats.json",
        ])
        .unwrap();
        let request = cli.request_for("EUR/USD").unwrap();
        assert_eq!(request.session, SessionSelector::Named(TradingSession::London));
        assert_eq!(request.manual_event(), Some("ECB"));
        assert_eq!(request.event_overlap.as_deref(), Some("NY"));
        assert_eq!(request.pip_size_override(), Some(0.0001));
        assert_eq!(
            request.historical_stats,
            HistoricalStatsSource::File(PathBuf::from("stats.json"))
        );
        assert!(!cli.should_save());
    }

    #[test]
    fn defaults_and_bad_session() {
        let cli = Cli::try_parse_from(["session-sniper", "GBPJPY", "USDJPY"]).unwrap();
        assert_eq!(cli.pairs.len(), 2);
        assert_eq!(cli.session_selector().unwrap(), SessionSelector::Auto);
        assert_eq!(cli.candle_dir, PathBuf::from(CANDLE_PATH));

        let cli = Cli::try_parse_from(["session-sniper", "EURUSD", "-s", "sydney"]).unwrap();
        assert!(matches!(
            cli.request_for("EURUSD"),
            Err(AnalysisError::InvalidSession(_))
        ));

        assert!(Cli::try_parse_from(["session-sniper"]).is_err());
    }
}
