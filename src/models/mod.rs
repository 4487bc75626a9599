// Data structures shared between the data layer, the analysis and callers
pub mod output;
pub mod request;
pub mod timeseries;

// Re-export commonly used types
pub use output::{AnalysisOutput, HistoricalContext, VolatilityExpectation};
pub use request::{
    AnalysisRequest, HistoricalStatsSource, load_historical_stats, read_historical_stats,
};
pub use timeseries::CandleSeries;
