use serde::{Deserialize, Serialize};

use crate::config::ANALYSIS;
use crate::utils::maths_utils::{round_to, safe_ratio};

/// Relative weight of each confidence signal. They sum to 1.0; the cap keeps
/// the total below that.
#[derive(Debug, Clone)]
pub struct ConfidenceWeights {
    pub sample_size: f64,
    pub pattern_strength: f64,
    pub event_catalyst: f64,
    pub data_quality: f64,
}

pub const WEIGHTS: ConfidenceWeights = ConfidenceWeights {
    sample_size: 0.40,
    pattern_strength: 0.25,
    event_catalyst: 0.20,
    data_quality: 0.15,
};

/// Matches needed for the full sample-size score
pub const SAMPLE_SATURATION: f64 = 120.0;

/// No analysis is ever reported as more certain than this
pub const MAX_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub sample_size_score: f64,
    pub pattern_strength_score: f64,
    pub event_catalyst_score: f64,
    pub data_quality_score: f64,
    pub total: f64,
}

/// Scores how much weight an analysis deserves from four independent signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScorer {
    max_data_age_days: i64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(ANALYSIS.confidence.max_data_age_days)
    }
}

impl ConfidenceScorer {
    pub fn new(max_data_age_days: i64) -> Self {
        Self { max_data_age_days }
    }

    fn components(
        &self,
        occurrences: usize,
        expansion_rate: f64,
        has_event: bool,
        data_age_days: i64,
    ) -> [f64; 4] {
        let sample = (occurrences as f64 / SAMPLE_SATURATION).min(1.0) * WEIGHTS.sample_size;
        let pattern = (expansion_rate - 0.5).abs() * 2.0 * WEIGHTS.pattern_strength;
        let event = if has_event { WEIGHTS.event_catalyst } else { 0.0 };
        let age_ratio = safe_ratio(data_age_days as f64, self.max_data_age_days as f64, 1.0);
        let quality = (1.0 - age_ratio).max(0.0) * WEIGHTS.data_quality;
        [sample, pattern, event, quality]
    }

    /// Weighted sum of the four signals, capped at `MAX_CONFIDENCE`, 2 decimals.
    pub fn calculate_confidence(
        &self,
        occurrences: usize,
        expansion_rate: f64,
        has_event: bool,
        data_age_days: i64,
    ) -> f64 {
        let total: f64 = self
            .components(occurrences, expansion_rate, has_event, data_age_days)
            .iter()
            .sum();
        round_to(total.min(MAX_CONFIDENCE), 2)
    }

    pub fn get_confidence_breakdown(
        &self,
        occurrences: usize,
        expansion_rate: f64,
        has_event: bool,
        data_age_days: i64,
    ) -> ConfidenceBreakdown {
        let [sample, pattern, event, quality] =
            self.components(occurrences, expansion_rate, has_event, data_age_days);
        ConfidenceBreakdown {
            sample_size_score: round_to(sample, 3),
            pattern_strength_score: round_to(pattern, 3),
            event_catalyst_score: round_to(event, 3),
            data_quality_score: round_to(quality, 3),
            total: round_to((sample + pattern + event + quality).min(MAX_CONFIDENCE), 2),
        }
    }
}

/// One-line reading of a confidence score, e.g.
/// "Moderate confidence: moderate historical sample, mixed historical outcomes."
pub fn get_confidence_explanation(
    confidence: f64,
    occurrences: usize,
    expansion_rate: f64,
    has_event: bool,
) -> String {
    let mut parts = Vec::with_capacity(3);

    parts.push(match occurrences {
        n if n >= 100 => "strong historical sample size",
        n if n >= 50 => "moderate historical sample",
        _ => "limited historical data",
    });

    parts.push(if expansion_rate > 0.7 {
        "clear expansion pattern"
    } else if expansion_rate < 0.3 {
        "clear range-bound pattern"
    } else {
        "mixed historical outcomes"
    });

    if has_event {
        parts.push("high-impact event scheduled");
    }

    let prefix = if confidence >= 0.70 {
        "High confidence:"
    } else if confidence >= 0.50 {
        "Moderate confidence:"
    } else {
        "Low confidence:"
    };

    format!("{} {}.", prefix, parts.join(", "))
}

/// Nudge confidence by the current volatility regime.
/// Unusual regimes (ratio > 1.5 or < 0.5) lose `adjustment_factor`; stable ones
/// (0.8..=1.2) gain half of it. Clamped to [0, `MAX_CONFIDENCE`].
pub fn adjust_for_volatility_regime(
    base_confidence: f64,
    current_atr: f64,
    avg_atr: f64,
    adjustment_factor: f64,
) -> f64 {
    if avg_atr == 0.0 {
        return base_confidence;
    }
    let volatility_ratio = current_atr / avg_atr;
    let adjustment = if !(0.5..=1.5).contains(&volatility_ratio) {
        -adjustment_factor
    } else if (0.8..=1.2).contains(&volatility_ratio) {
        adjustment_factor * 0.5
    } else {
        0.0
    };
    round_to((base_confidence + adjustment).clamp(0.0, MAX_CONFIDENCE), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = WEIGHTS.sample_size + WEIGHTS.pattern_strength + WEIGHTS.event_catalyst + WEIGHTS.data_quality;
        assert!(approx_eq(sum, 1.0));
    }

    #[test]
    fn small_sample_mild_pattern_fresh_data() {
        // 0.0533 + 0.065 + 0 + 0.1375
        let scorer = ConfidenceScorer::new(60);
        assert_eq!(scorer.calculate_confidence(16, 0.63, false, 5), 0.26);
    }

    #[test]
    fn total_is_capped() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.calculate_confidence(500, 1.0, true, 0), 0.85);
        assert_eq!(scorer.calculate_confidence(500, 0.0, true, 0), 0.85);
    }

    #[test]
    fn neutral_rate_contributes_nothing() {
        let scorer = ConfidenceScorer::default();
        let breakdown = scorer.get_confidence_breakdown(0, 0.5, false, 60);
        assert_eq!(breakdown.pattern_strength_score, 0.0);
        assert_eq!(breakdown.sample_size_score, 0.0);
        assert_eq!(breakdown.data_quality_score, 0.0);
        assert_eq!(breakdown.total, 0.0);
    }

    #[test]
    fn stale_data_scores_zero_quality() {
        let scorer = ConfidenceScorer::default();
        let breakdown = scorer.get_confidence_breakdown(60, 0.8, true, 90);
        assert_eq!(breakdown.data_quality_score, 0.0);
        assert_eq!(breakdown.sample_size_score, 0.2);
        assert_eq!(breakdown.pattern_strength_score, 0.15);
        assert_eq!(breakdown.event_catalyst_score, 0.2);
        assert_eq!(breakdown.total, 0.55);
        assert_eq!(breakdown.total, scorer.calculate_confidence(60, 0.8, true, 90));
    }

    #[test]
    fn breakdown_rounds_components_to_three_places() {
        let scorer = ConfidenceScorer::new(60);
        let breakdown = scorer.get_confidence_breakdown(16, 0.63, false, 5);
        assert_eq!(breakdown.sample_size_score, 0.053);
        assert_eq!(breakdown.pattern_strength_score, 0.065);
        assert!((breakdown.data_quality_score - 0.1375).abs() <= 0.0005 + 1e-12);
        assert_eq!(breakdown.total, 0.26);
    }

    #[test]
    fn explanation_wording() {
        assert_eq!(
            get_confidence_explanation(0.74, 112, 0.62, true),
            "High confidence: strong historical sample size, mixed historical outcomes, high-impact event scheduled."
        );
        assert_eq!(
            get_confidence_explanation(0.5, 50, 0.8, false),
            "Moderate confidence: moderate historical sample, clear expansion pattern."
        );
        assert_eq!(
            get_confidence_explanation(0.2, 3, 0.1, false),
            "Low confidence: limited historical data, clear range-bound pattern."
        );
    }

    #[test]
    fn regime_adjustment_rules() {
        // No average: unchanged, not even rounded
        assert_eq!(adjust_for_volatility_regime(0.555, 3.0, 0.0, 0.1), 0.555);
        // Unusual regimes
        assert_eq!(adjust_for_volatility_regime(0.6, 16.0, 10.0, 0.1), 0.5);
        assert_eq!(adjust_for_volatility_regime(0.6, 4.0, 10.0, 0.1), 0.5);
        // Stable regime
        assert_eq!(adjust_for_volatility_regime(0.6, 10.0, 10.0, 0.1), 0.65);
        // In between
        assert_eq!(adjust_for_volatility_regime(0.6, 13.0, 10.0, 0.1), 0.6);
        // Clamped
        assert_eq!(adjust_for_volatility_regime(0.84, 10.0, 10.0, 0.1), 0.85);
        assert_eq!(adjust_for_volatility_regime(0.05, 30.0, 10.0, 0.1), 0.0);
    }
}
