use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::range_engine::RangeEngine;
use crate::config::{ANALYSIS, DEBUG_FLAGS};
use crate::domain::{Candle, CandleType, SessionWindow};
use crate::models::HistoricalContext;
use crate::models::timeseries::{filter_time_of_day, partition_days};
use crate::utils::maths_utils::{mean_or_zero, round_to};
use crate::utils::time_utils::format_date;

/// A session "expanded" when its range exceeds the pre-session range by this factor.
pub const EXPANSION_MULTIPLIER: f64 = 1.5;

/// One historical day that resembled today's pre-session conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDayRecord {
    pub date: NaiveDate,
    pub pre_session_range_pips: f64,
    pub session_range_pips: f64,
    pub expanded: bool,
    pub expansion_pips: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatchResult {
    pub occurrence_count: usize,
    /// Share of matches that expanded (0.5 when nothing matched)
    pub expansion_rate: f64,
    pub avg_expansion_pips: f64,
    /// Most recent matches, oldest first
    pub matched_dates: Vec<NaiveDate>,
}

impl PatternMatchResult {
    /// No evidence either way
    pub fn neutral() -> Self {
        Self::from(&HistoricalContext::neutral())
    }

    pub fn historical_context(&self) -> HistoricalContext {
        HistoricalContext {
            occurrences: self.occurrence_count,
            expansion_rate: self.expansion_rate,
        }
    }
}

impl From<&HistoricalContext> for PatternMatchResult {
    fn from(ctx: &HistoricalContext) -> Self {
        Self {
            occurrence_count: ctx.occurrences,
            expansion_rate: ctx.expansion_rate,
            avg_expansion_pips: 0.0,
            matched_dates: Vec::new(),
        }
    }
}

/// How listed event days compare to ordinary days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDayStats {
    pub event_day_count: usize,
    pub avg_event_day_range_pips: f64,
    /// Mean event-day session range over mean non-event-day session range
    pub multiplier: f64,
}

impl Default for EventDayStats {
    fn default() -> Self {
        Self {
            event_day_count: 0,
            avg_event_day_range_pips: 0.0,
            multiplier: 1.0,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalBias {
    pub bias: Bias,
    pub bullish_pct: f64,
    pub bearish_pct: f64,
    pub sample_size: usize,
}

impl Default for DirectionalBias {
    fn default() -> Self {
        Self {
            bias: Bias::Neutral,
            bullish_pct: 50.0,
            bearish_pct: 50.0,
            sample_size: 0,
        }
    }
}

/// Finds historical days whose pre-session compression resembles today's.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    engine: RangeEngine,
    pre_session_minutes: i64,
    similarity_threshold: f64,
    max_matched_dates: usize,
    directional_bias_pct: f64,
}

impl PatternMatcher {
    pub fn new(engine: RangeEngine) -> Self {
        Self {
            engine,
            pre_session_minutes: ANALYSIS.pre_session.window_minutes,
            similarity_threshold: ANALYSIS.pattern.similarity_threshold,
            max_matched_dates: ANALYSIS.pattern.max_matched_dates,
            directional_bias_pct: ANALYSIS.pattern.directional_bias_pct,
        }
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_pre_session_minutes(mut self, minutes: i64) -> Self {
        self.pre_session_minutes = minutes;
        self
    }

    /// Every historical day whose pre-session/average ratio lies within the
    /// similarity band around today's ratio, oldest first.
    pub fn matching_days(
        &self,
        current_pre_range: f64,
        avg_pre_range: f64,
        historical: &[Candle],
        window: &SessionWindow,
    ) -> Vec<HistoricalDayRecord> {
        if avg_pre_range == 0.0 {
            return Vec::new();
        }
        let current_ratio = current_pre_range / avg_pre_range;
        let lower = current_ratio - self.similarity_threshold;
        let upper = current_ratio + self.similarity_threshold;

        partition_days(historical)
            .into_iter()
            .filter_map(|(date, day)| {
                let pre_range = self.engine.pre_session_range_on(
                    historical,
                    date,
                    window.start,
                    self.pre_session_minutes,
                );
                if pre_range == 0.0 {
                    return None;
                }
                let day_ratio = pre_range / avg_pre_range;
                if day_ratio < lower || day_ratio > upper {
                    return None;
                }
                // Session not traded yet (e.g. today): no outcome to count
                let session = filter_time_of_day(day, window.start, window.end);
                if session.is_empty() {
                    return None;
                }
                let session_range = self.engine.range_pips(&session);
                let record = HistoricalDayRecord {
                    date,
                    pre_session_range_pips: pre_range,
                    session_range_pips: session_range,
                    expanded: session_range > pre_range * EXPANSION_MULTIPLIER,
                    expansion_pips: session_range - pre_range,
                };
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_pattern_days {
                    log::info!(
                        "  match {}: pre {:.1} session {:.1} ratio {:.2} expanded {}",
                        format_date(date),
                        record.pre_session_range_pips,
                        record.session_range_pips,
                        day_ratio,
                        record.expanded
                    );
                }
                Some(record)
            })
            .collect()
    }

    pub fn find_similar_conditions(
        &self,
        current_pre_range: f64,
        avg_pre_range: f64,
        historical: &[Candle],
        window: &SessionWindow,
    ) -> PatternMatchResult {
        let matches = self.matching_days(current_pre_range, avg_pre_range, historical, window);
        if matches.is_empty() {
            return PatternMatchResult::neutral();
        }

        let expanded = matches.iter().filter(|m| m.expanded).count();
        let expansion: Vec<f64> = matches.iter().map(|m| m.expansion_pips).collect();
        let recent_start = matches.len().saturating_sub(self.max_matched_dates);

        PatternMatchResult {
            occurrence_count: matches.len(),
            expansion_rate: round_to(expanded as f64 / matches.len() as f64, 2),
            avg_expansion_pips: round_to(mean_or_zero(&expansion), 1),
            matched_dates: matches[recent_start..].iter().map(|m| m.date).collect(),
        }
    }

    /// Session range on listed event dates versus every other day.
    pub fn event_day_patterns(
        &self,
        historical: &[Candle],
        event_dates: &[NaiveDate],
        window: &SessionWindow,
    ) -> EventDayStats {
        let listed: HashSet<NaiveDate> = event_dates.iter().copied().collect();
        let mut event_ranges = Vec::new();
        let mut other_ranges = Vec::new();

        for (date, day) in partition_days(historical) {
            let range = self.engine.session_range(day, window.start, window.end);
            if listed.contains(&date) {
                event_ranges.push(range);
            } else if range > 0.0 {
                other_ranges.push(range);
            }
        }

        if event_ranges.is_empty() {
            return EventDayStats::default();
        }

        let avg_event = mean_or_zero(&event_ranges);
        let avg_other = if other_ranges.is_empty() {
            avg_event
        } else {
            mean_or_zero(&other_ranges)
        };
        let multiplier = if avg_other > 0.0 {
            avg_event / avg_other
        } else {
            1.0
        };

        EventDayStats {
            event_day_count: event_ranges.len(),
            avg_event_day_range_pips: round_to(avg_event, 1),
            multiplier: round_to(multiplier, 2),
        }
    }

    /// Share of days whose session closed above its open.
    pub fn directional_bias(&self, historical: &[Candle], window: &SessionWindow) -> DirectionalBias {
        let (mut bullish, mut bearish) = (0usize, 0usize);

        for (_, day) in partition_days(historical) {
            let session = filter_time_of_day(day, window.start, window.end);
            let (Some(first), Some(last)) = (session.first(), session.last()) else {
                continue;
            };
            let summary = Candle::new(first.timestamp, first.open, 0.0, 0.0, last.close, 0.0);
            match summary.get_type() {
                CandleType::Bullish => bullish += 1,
                CandleType::Bearish => bearish += 1,
            }
        }

        let total = bullish + bearish;
        if total == 0 {
            return DirectionalBias::default();
        }

        let bullish_pct = bullish as f64 / total as f64 * 100.0;
        let bearish_pct = bearish as f64 / total as f64 * 100.0;
        let bias = if bullish_pct > self.directional_bias_pct {
            Bias::Bullish
        } else if bearish_pct > self.directional_bias_pct {
            Bias::Bearish
        } else {
            Bias::Neutral
        };

        DirectionalBias {
            bias,
            bullish_pct: round_to(bullish_pct, 1),
            bearish_pct: round_to(bearish_pct, 1),
            sample_size: total,
        }
    }
}
