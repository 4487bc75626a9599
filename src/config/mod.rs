//! Configuration module for the session analyzer.

pub mod analysis;
pub mod calendar;

mod debug; // Private: use crate::config::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod pairs;
pub mod persistence;
pub mod sessions;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig};
pub use calendar::HIGH_IMPACT_KEYWORDS;
pub use pairs::PAIRS;
pub use persistence::{
    CANDLE_PATH, OUTPUT_DIR, PERSISTENCE, SNAPSHOT_VERSION, candle_csv_filename,
    snapshot_filename,
};
pub use sessions::{MARKET_CLOSED_LABEL, SESSIONS, WEEKEND};
