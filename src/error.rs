//! Caller-facing analysis errors.
//!
//! Only input problems and schema violations are errors. Missing market data,
//! degenerate statistics and calendar outages degrade to neutral defaults instead.

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid pair '{input}': {reason}")]
    InvalidPair { input: String, reason: String },

    #[error("Invalid session '{0}': must be 'asian', 'london', 'ny', or 'auto'")]
    InvalidSession(String),

    #[error("Failed to load historical stats: {0:#}")]
    HistoricalStats(anyhow::Error),

    #[error("Output failed schema validation: {0}")]
    InvalidOutput(String),
}
