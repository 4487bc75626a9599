use serde::{Deserialize, Serialize};

use crate::config::MARKET_CLOSED_LABEL;
use crate::error::AnalysisError;

/// Volatility tier handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum VolatilityExpectation {
    Low,
    Moderate,
    High,
}

/// Historical analog statistics referenced by the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoricalContext {
    #[serde(rename = "similar_conditions_occurrences")]
    pub occurrences: usize,
    pub expansion_rate: f64,
}

impl HistoricalContext {
    /// Neutral prior used whenever there is nothing to compare against.
    pub fn neutral() -> Self {
        Self {
            occurrences: 0,
            expansion_rate: 0.5,
        }
    }
}

/// Final artifact of one analysis request. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOutput {
    pub pair: String,
    pub session: String,
    pub time_window_minutes: i64,
    pub volatility_expectation: VolatilityExpectation,
    pub expected_deviation_pips: f64,
    pub confidence: f64,
    pub drivers: Vec<String>,
    pub historical_context: HistoricalContext,
    pub agent_guidance: String,
}

impl AnalysisOutput {
    /// Fixed result returned while the market is in its weekend closure.
    pub fn market_closed(pair_display: &str) -> Self {
        Self {
            pair: pair_display.to_string(),
            session: MARKET_CLOSED_LABEL.to_string(),
            time_window_minutes: 0,
            volatility_expectation: VolatilityExpectation::Low,
            expected_deviation_pips: 0.0,
            confidence: 0.0,
            drivers: vec![
                "Forex market closed for weekend".to_string(),
                "Market reopens Sunday 22:00 UTC".to_string(),
            ],
            historical_context: HistoricalContext {
                occurrences: 0,
                expansion_rate: 0.0,
            },
            agent_guidance: "Wait for market open. Review weekly levels and news during closure."
                .to_string(),
        }
    }

    pub fn is_market_closed(&self) -> bool {
        self.session == MARKET_CLOSED_LABEL
    }

    /// Check the output contract before handing it to a caller.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let fail = |msg: &str| Err(AnalysisError::InvalidOutput(msg.to_string()));

        if self.pair.trim().is_empty() {
            return fail("pair must not be empty");
        }
        if self.session.trim().is_empty() {
            return fail("session must not be empty");
        }
        if self.agent_guidance.trim().is_empty() {
            return fail("agent_guidance must not be empty");
        }
        if self.time_window_minutes <= 0 && !self.is_market_closed() {
            return fail("time_window_minutes must be positive");
        }
        if !(self.expected_deviation_pips >= 0.0) {
            return fail("expected_deviation_pips must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return fail("confidence must lie in [0, 1]");
        }
        if self.drivers.is_empty() {
            return fail("drivers must not be empty");
        }
        if self.drivers.iter().any(|d| d.trim().is_empty()) {
            return fail("driver entries must not be blank");
        }
        if !(0.0..=1.0).contains(&self.historical_context.expansion_rate) {
            return fail("expansion_rate must lie in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisOutput {
        AnalysisOutput {
            pair: "EUR/USD".to_string(),
            session: "London Session".to_string(),
            time_window_minutes: 90,
            volatility_expectation: VolatilityExpectation::High,
            expected_deviation_pips: 38.0,
            confidence: 0.74,
            drivers: vec!["Pre-session range compressed (18 pips vs 30-day avg of 32 pips)".into()],
            historical_context: HistoricalContext {
                occurrences: 112,
                expansion_rate: 0.62,
            },
            agent_guidance: "Avoid mean-reversion strategies.".to_string(),
        }
    }

    #[test]
    fn valid_output_passes() {
        assert!(sample().validate().is_ok());
        assert!(AnalysisOutput::market_closed("EUR/USD").validate().is_ok());
    }

    #[test]
    fn rejects_blank_driver_and_bad_confidence() {
        let mut out = sample();
        out.drivers.push("   ".into());
        assert!(matches!(out.validate(), Err(AnalysisError::InvalidOutput(_))));

        let mut out = sample();
        out.confidence = 1.2;
        assert!(out.validate().is_err());

        let mut out = sample();
        out.drivers.clear();
        assert!(out.validate().is_err());

        let mut out = sample();
        out.time_window_minutes = 0;
        assert!(out.validate().is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["volatility_expectation"], "High");
        assert_eq!(json["historical_context"]["similar_conditions_occurrences"], 112);
        let back: AnalysisOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
