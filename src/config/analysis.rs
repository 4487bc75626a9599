//! Analysis and computation configuration

/// Pre-session window used as the compression signal
#[derive(Debug, Clone)]
pub struct PreSessionSettings {
    // Lookback immediately preceding the session start
    pub window_minutes: i64,
    // Current/average ratio at or below which the range counts as compressed
    pub compression_threshold: f64,
}

/// Settings for historical analog matching
#[derive(Debug, Clone)]
pub struct PatternSettings {
    // Half-width of the acceptance band around today's compression ratio
    pub similarity_threshold: f64,
    // Number of most recent matched dates kept for inspection
    pub max_matched_dates: usize,
    // A side must exceed this share of days (percentage) to declare a directional bias
    pub directional_bias_pct: f64,
}

/// Settings for the confidence score
#[derive(Debug, Clone)]
pub struct ConfidenceSettings {
    // Data older than this (days) contributes nothing to data quality
    pub max_data_age_days: i64,
    // Amount added/removed by the volatility regime adjustment
    pub regime_adjustment_factor: f64,
    pub apply_regime_adjustment: bool,
    // Ceiling applied when the analysis ran on fallback values (no live data)
    pub fallback_confidence_cap: f64,
}

/// What to ask the candle source for
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub candle_interval_minutes: i64,
    // Recent candles used for the current pre-session range (~8 hours of 5m)
    pub intraday_candles: usize,
    pub historical_days: i64,
    // Upper bound on a single historical request
    pub max_candles_per_request: usize,
}

/// Economic calendar lookup
#[derive(Debug, Clone)]
pub struct CalendarSettings {
    // Search radius around the session start
    pub event_window_minutes: i64,
}

/// Volatility tier thresholds, in pips, before session scaling
#[derive(Debug, Clone)]
pub struct TierThresholds {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone)]
pub struct ClassificationSettings {
    pub standard: TierThresholds,
    pub jpy: TierThresholds,
    pub asian_multiplier: f64,
    pub london_multiplier: f64,
    pub new_york_multiplier: f64,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Period of the average true range
    pub atr_period: usize,

    // Sub-groups
    pub pre_session: PreSessionSettings,
    pub pattern: PatternSettings,
    pub confidence: ConfidenceSettings,
    pub fetch: FetchSettings,
    pub calendar: CalendarSettings,
    pub classification: ClassificationSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    atr_period: 14,

    pre_session: PreSessionSettings {
        window_minutes: 90,
        compression_threshold: 0.7,
    },

    pattern: PatternSettings {
        similarity_threshold: 0.15,
        max_matched_dates: 10,
        directional_bias_pct: 60.0,
    },

    confidence: ConfidenceSettings {
        max_data_age_days: 60,
        regime_adjustment_factor: 0.10,
        apply_regime_adjustment: true,
        fallback_confidence_cap: 0.5,
    },

    fetch: FetchSettings {
        candle_interval_minutes: 5,
        intraday_candles: 100,
        historical_days: 60,
        // Vendor limit per request (60 days of 5m is ~17k candles)
        max_candles_per_request: 5000,
    },

    calendar: CalendarSettings {
        event_window_minutes: 120,
    },

    classification: ClassificationSettings {
        standard: TierThresholds {
            low: 15.0,
            high: 35.0,
        },
        // JPY pairs are more volatile in pip terms
        jpy: TierThresholds {
            low: 25.0,
            high: 60.0,
        },
        asian_multiplier: 0.7,
        london_multiplier: 1.2,
        new_york_multiplier: 1.1,
    },
};
