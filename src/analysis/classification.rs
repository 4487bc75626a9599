use crate::config::analysis::{ClassificationSettings, TierThresholds};
use crate::domain::{PairKind, TradingSession};
use crate::models::VolatilityExpectation;

impl ClassificationSettings {
    /// Thresholds for the pair type, scaled by the session multiplier.
    pub fn adjusted_thresholds(&self, kind: PairKind, session: TradingSession) -> TierThresholds {
        let base = match kind {
            PairKind::Jpy => &self.jpy,
            PairKind::Standard | PairKind::Crypto => &self.standard,
        };
        let multiplier = match session {
            TradingSession::Asian => self.asian_multiplier,
            TradingSession::London => self.london_multiplier,
            TradingSession::NewYork => self.new_york_multiplier,
        };
        TierThresholds {
            low: base.low * multiplier,
            high: base.high * multiplier,
        }
    }
}

pub fn classify_volatility(
    expected_pips: f64,
    kind: PairKind,
    session: TradingSession,
    settings: &ClassificationSettings,
) -> VolatilityExpectation {
    let thresholds = settings.adjusted_thresholds(kind, session);
    if expected_pips < thresholds.low {
        VolatilityExpectation::Low
    } else if expected_pips < thresholds.high {
        VolatilityExpectation::Moderate
    } else {
        VolatilityExpectation::High
    }
}

/// Strategy sentence for the conditions. Rules are checked in order; the first match wins.
pub fn agent_guidance(
    tier: VolatilityExpectation,
    expansion_rate: f64,
    is_compressed: bool,
    has_event: bool,
) -> &'static str {
    use VolatilityExpectation::*;

    match tier {
        High if expansion_rate > 0.6 && is_compressed => {
            "Avoid mean-reversion strategies; favor breakout or momentum confirmation setups."
        }
        High if has_event => {
            "High-impact event expected; consider wider stops and wait for initial volatility to settle before entering."
        }
        Low if expansion_rate < 0.4 => {
            "Range-bound conditions likely; favor mean-reversion strategies with tight stops."
        }
        _ if is_compressed && expansion_rate > 0.5 => {
            "Compressed range suggests coiled spring; monitor for breakout in direction of higher timeframe trend."
        }
        Moderate => {
            "Moderate volatility expected; standard risk management applies. Watch for direction confirmation."
        }
        _ if has_event && expansion_rate < 0.5 => {
            "Event scheduled but historical expansion limited; consider reduced position sizing and avoid early entries."
        }
        _ => "Mixed signals; wait for clearer price action confirmation before entering positions.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    fn classify(pips: f64, kind: PairKind, session: TradingSession) -> VolatilityExpectation {
        classify_volatility(pips, kind, session, &ANALYSIS.classification)
    }

    #[test]
    fn london_standard_thresholds() {
        // 15 * 1.2 = 18, 35 * 1.2 = 42
        assert_eq!(classify(17.9, PairKind::Standard, TradingSession::London), VolatilityExpectation::Low);
        assert_eq!(classify(18.0, PairKind::Standard, TradingSession::London), VolatilityExpectation::Moderate);
        assert_eq!(classify(41.9, PairKind::Standard, TradingSession::London), VolatilityExpectation::Moderate);
        assert_eq!(classify(42.0, PairKind::Standard, TradingSession::London), VolatilityExpectation::High);
    }

    #[test]
    fn jpy_and_crypto_thresholds() {
        // JPY Asian: 25 * 0.7 = 17.5, 60 * 0.7 = 42
        assert_eq!(classify(20.0, PairKind::Jpy, TradingSession::Asian), VolatilityExpectation::Moderate);
        assert_eq!(classify(20.0, PairKind::Standard, TradingSession::Asian), VolatilityExpectation::Moderate);
        assert_eq!(classify(30.0, PairKind::Standard, TradingSession::Asian), VolatilityExpectation::High);
        assert_eq!(classify(30.0, PairKind::Jpy, TradingSession::Asian), VolatilityExpectation::Moderate);
        // Crypto falls back to the standard table
        assert_eq!(classify(45.0, PairKind::Crypto, TradingSession::NewYork), VolatilityExpectation::High);
    }

    #[test]
    fn guidance_rule_order() {
        use VolatilityExpectation::*;
        assert!(agent_guidance(High, 0.7, true, true).starts_with("Avoid mean-reversion"));
        assert!(agent_guidance(High, 0.7, false, true).starts_with("High-impact event expected"));
        assert!(agent_guidance(Low, 0.3, false, false).starts_with("Range-bound conditions"));
        assert!(agent_guidance(Low, 0.55, true, false).starts_with("Compressed range"));
        assert!(agent_guidance(Moderate, 0.55, true, false).starts_with("Compressed range"));
        assert!(agent_guidance(Moderate, 0.2, false, true).starts_with("Moderate volatility"));
        assert!(agent_guidance(Low, 0.45, false, true).starts_with("Event scheduled"));
        assert!(agent_guidance(High, 0.5, false, false).starts_with("Mixed signals"));
    }
}
