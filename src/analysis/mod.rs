// Range statistics, analog matching, confidence and tier classification
pub mod classification;
pub mod confidence;
pub mod pattern_matcher;
pub mod range_engine;

// Re-export commonly used types
pub use classification::{agent_guidance, classify_volatility};
pub use confidence::{ConfidenceBreakdown, ConfidenceScorer};
pub use pattern_matcher::{DirectionalBias, EventDayStats, PatternMatchResult, PatternMatcher};
pub use range_engine::{RangeEngine, RangeStats};
