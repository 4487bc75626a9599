use std::ops::Deref;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::utils::TimeUtils;

// ============================================================================
// CandleSeries: ordered candles for one pair/interval
// ============================================================================

/// Candles in ascending timestamp order with no duplicate timestamps.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Sorts by timestamp and drops repeated timestamps (first occurrence wins).
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Self { candles }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.candles.last().map(Candle::date)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.timestamp)
    }

    /// The most recent `count` candles.
    pub fn tail(&self, count: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(count);
        &self.candles[start..]
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.candles
    }
}

/// Split ordered candles into calendar days (UTC), oldest first.
pub fn partition_days(candles: &[Candle]) -> Vec<(NaiveDate, &[Candle])> {
    candles
        .chunk_by(|a, b| a.date() == b.date())
        .filter_map(|day| day.first().map(|c| (c.date(), day)))
        .collect()
}

/// Candles of the most recent calendar day present.
pub fn latest_day(candles: &[Candle]) -> &[Candle] {
    match candles.last() {
        Some(last) => {
            let date = last.date();
            let start = candles
                .iter()
                .rposition(|c| c.date() != date)
                .map_or(0, |idx| idx + 1);
            &candles[start..]
        }
        None => &[],
    }
}

/// Candles with `start <= timestamp < end`.
pub fn between(candles: &[Candle], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Candle> {
    candles
        .iter()
        .filter(|c| c.timestamp >= start && c.timestamp < end)
        .copied()
        .collect()
}

/// Candles whose time-of-day lies in the half-open window, ignoring the date.
pub fn filter_time_of_day(candles: &[Candle], start: NaiveTime, end: NaiveTime) -> Vec<Candle> {
    candles
        .iter()
        .filter(|c| TimeUtils::time_in_window(c.time_of_day(), start, end))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn candle_at(ts: DateTime<Utc>, price: f64) -> Candle {
        Candle::new(ts, price, price + 0.001, price - 0.001, price, 1.0)
    }

    #[test]
    fn new_sorts_and_removes_duplicate_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2025, 2, 10, 8, 0, 0).unwrap();
        let t1 = t0 + TimeDelta::minutes(5);
        let series = CandleSeries::new(vec![
            candle_at(t1, 1.2),
            candle_at(t0, 1.1),
            candle_at(t1, 9.9),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].timestamp, t0);
        assert_eq!(series[1].open, 1.2);
    }

    #[test]
    fn partitions_by_calendar_day() {
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 22, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..6)
            .map(|i| candle_at(start + TimeDelta::hours(i), 1.1))
            .collect();
        let series = CandleSeries::new(candles);
        let days = partition_days(&series);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].1.len(), 2);
        assert_eq!(days[1].1.len(), 4);
        assert_eq!(latest_day(&series).len(), 4);
        assert_eq!(series.latest_date(), Some(days[1].0));
    }

    #[test]
    fn time_of_day_filter_wraps_midnight() {
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 20, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..8)
            .map(|i| candle_at(start + TimeDelta::hours(i), 1.1))
            .collect();
        let kept = filter_time_of_day(
            &candles,
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
        );
        // 22:00, 23:00, 00:00, 01:00
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn empty_series_helpers() {
        let series = CandleSeries::default();
        assert!(partition_days(&series).is_empty());
        assert!(latest_day(&series).is_empty());
        assert_eq!(series.latest_date(), None);
        assert!(series.tail(10).is_empty());
    }
}
