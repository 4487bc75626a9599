//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. All of them are further gated by `cfg(debug_assertions)`.

/// Emit per-day pre-session/session ranges while matching historical analogs.
pub const PRINT_PATTERN_DAYS: bool = false;

/// Emit the confidence breakdown for every analysis.
pub const PRINT_CONFIDENCE_BREAKDOWN: bool = false;

/// Emit candle cache hit/miss diagnostics.
pub const PRINT_CANDLE_CACHE_EVENTS: bool = false;

/// Emit detailed serialization/deserialization logs (CSV, snapshots, output files).
pub const PRINT_SERDE: bool = false;

pub struct DebugFlags {
    pub print_pattern_days: bool,
    pub print_confidence_breakdown: bool,
    pub print_candle_cache_events: bool,
    pub print_serde: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_pattern_days: PRINT_PATTERN_DAYS,
    print_confidence_breakdown: PRINT_CONFIDENCE_BREAKDOWN,
    print_candle_cache_events: PRINT_CANDLE_CACHE_EVENTS,
    print_serde: PRINT_SERDE,
};
