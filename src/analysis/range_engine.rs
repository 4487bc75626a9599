use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::config::ANALYSIS;
use crate::domain::{Candle, Pair};
use crate::models::timeseries::{between, filter_time_of_day, partition_days};
use crate::utils::TimeUtils;
use crate::utils::maths_utils::{get_max, get_min, mean_or_zero, round_to, safe_ratio};

/// Minimum expected deviation ever reported, in pips
pub const MIN_EXPECTED_DEVIATION_PIPS: f64 = 10.0;

/// Weight applied to the compressed amount when projecting expansion
pub const EXPANSION_PROJECTION_FACTOR: f64 = 1.5;

/// Pip-denominated statistics for one session window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    pub range_pips: f64,
    pub atr_pips: f64,
    pub avg_candle_range_pips: f64,
    pub max_candle_range_pips: f64,
    pub candle_count: usize,
}

/// Converts candle windows into pip ranges for one pip size.
///
/// Nothing here fails: empty or sparse input yields 0.0 (or the neutral ratio 1.0)
/// so an analysis can always be assembled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEngine {
    pip_size: f64,
    compression_threshold: f64,
}

impl RangeEngine {
    pub fn new(pip_size: f64) -> Self {
        Self {
            pip_size,
            compression_threshold: ANALYSIS.pre_session.compression_threshold,
        }
    }

    pub fn for_pair(pair: &Pair) -> Self {
        Self::new(pair.pip_size())
    }

    pub fn with_compression_threshold(mut self, threshold: f64) -> Self {
        self.compression_threshold = threshold;
        self
    }

    pub fn pip_size(&self) -> f64 {
        self.pip_size
    }

    pub fn compression_threshold(&self) -> f64 {
        self.compression_threshold
    }

    /// Price difference to pips, rounded to one decimal.
    pub fn price_to_pips(&self, price_difference: f64) -> f64 {
        round_to(safe_ratio(price_difference, self.pip_size, 0.0), 1)
    }

    /// max(high) - min(low) across every candle given.
    pub fn range_pips(&self, candles: &[Candle]) -> f64 {
        if candles.is_empty() {
            return 0.0;
        }
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        self.price_to_pips(get_max(&highs) - get_min(&lows))
    }

    /// Range of `[session_start - minutes_before, session_start)` on the latest day present.
    /// Earlier days are ignored; the window itself may reach back into the previous evening.
    pub fn pre_session_range(
        &self,
        candles: &[Candle],
        session_start: NaiveTime,
        minutes_before: i64,
    ) -> f64 {
        match candles.last() {
            Some(last) => {
                self.pre_session_range_on(candles, last.date(), session_start, minutes_before)
            }
            None => 0.0,
        }
    }

    /// Pre-session range anchored on the session start of `date`.
    pub fn pre_session_range_on(
        &self,
        candles: &[Candle],
        date: NaiveDate,
        session_start: NaiveTime,
        minutes_before: i64,
    ) -> f64 {
        let window_end = TimeUtils::at(date, session_start);
        let window_start = window_end - TimeDelta::minutes(minutes_before);
        self.range_pips(&between(candles, window_start, window_end))
    }

    /// Range of the candles whose time-of-day is in `[start, end)`, ignoring dates.
    pub fn session_range(&self, candles: &[Candle], start: NaiveTime, end: NaiveTime) -> f64 {
        self.range_pips(&filter_time_of_day(candles, start, end))
    }

    /// Mean per-day range of the pre-session window (`is_pre_session`) or of the
    /// `window_minutes` following `session_start`. Days with a zero range are skipped.
    pub fn average_range(
        &self,
        historical: &[Candle],
        session_start: NaiveTime,
        window_minutes: i64,
        is_pre_session: bool,
    ) -> f64 {
        let session_end = session_start + TimeDelta::minutes(window_minutes);
        let daily_ranges: Vec<f64> = partition_days(historical)
            .into_iter()
            .map(|(date, day)| {
                if is_pre_session {
                    self.pre_session_range_on(historical, date, session_start, window_minutes)
                } else {
                    self.session_range(day, session_start, session_end)
                }
            })
            .filter(|range| *range > 0.0)
            .collect();
        mean_or_zero(&daily_ranges)
    }

    /// Returns `(is_compressed, ratio)`; ratio is rounded to 2 decimals and is 1.0
    /// when there is no average to compare against.
    pub fn detect_compression(current_range: f64, avg_range: f64, threshold: f64) -> (bool, f64) {
        if avg_range == 0.0 {
            return (false, 1.0);
        }
        let ratio = current_range / avg_range;
        (ratio <= threshold, round_to(ratio, 2))
    }

    pub fn is_compressed(&self, current_range: f64, avg_range: f64) -> (bool, f64) {
        Self::detect_compression(current_range, avg_range, self.compression_threshold)
    }

    /// Average session range, plus projected expansion when the pre-session is compressed.
    /// Never below `MIN_EXPECTED_DEVIATION_PIPS`.
    pub fn expected_deviation(
        &self,
        current_pre_range: f64,
        avg_pre_range: f64,
        historical_expansion_rate: f64,
        avg_session_range: f64,
    ) -> f64 {
        let (compressed, _) = self.is_compressed(current_pre_range, avg_pre_range);
        let expected = if compressed {
            let compression_amount = avg_pre_range - current_pre_range;
            avg_session_range
                + compression_amount * historical_expansion_rate * EXPANSION_PROJECTION_FACTOR
        } else {
            avg_session_range
        };
        expected.max(MIN_EXPECTED_DEVIATION_PIPS)
    }

    /// Mean true range of the last `period` candles, in pips. 0 with fewer candles.
    pub fn average_true_range(&self, candles: &[Candle], period: usize) -> f64 {
        if period == 0 || candles.len() < period {
            return 0.0;
        }
        let prev_closes = std::iter::once(None).chain(candles.iter().map(|c| Some(c.close)));
        let true_ranges: Vec<f64> = candles
            .iter()
            .zip(prev_closes)
            .map(|(candle, prev_close)| candle.true_range(prev_close))
            .collect();
        let window = &true_ranges[true_ranges.len() - period..];
        self.price_to_pips(mean_or_zero(window))
    }

    /// Range, ATR and single-candle statistics for the session window.
    pub fn range_statistics(&self, candles: &[Candle], start: NaiveTime, end: NaiveTime) -> RangeStats {
        let session = filter_time_of_day(candles, start, end);
        if session.is_empty() {
            return RangeStats::default();
        }
        let candle_ranges: Vec<f64> = session.iter().map(Candle::range).collect();
        RangeStats {
            range_pips: self.range_pips(&session),
            atr_pips: self.average_true_range(&session, ANALYSIS.atr_period),
            avg_candle_range_pips: self.price_to_pips(mean_or_zero(&candle_ranges)),
            max_candle_range_pips: self.price_to_pips(get_max(&candle_ranges)),
            candle_count: session.len(),
        }
    }

    /// Mean of the per-day ATR across days that have one.
    pub fn average_daily_atr(&self, historical: &[Candle], period: usize) -> f64 {
        let daily: Vec<f64> = partition_days(historical)
            .into_iter()
            .map(|(_, day)| self.average_true_range(day, period))
            .filter(|atr| *atr > 0.0)
            .collect();
        mean_or_zero(&daily)
    }

    pub fn session_duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
        TimeUtils::wrapped_duration_minutes(start, end)
    }
}
