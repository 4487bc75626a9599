use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const MINUTES_IN_H: i64 = 60;
    pub const MINUTES_IN_D: i64 = Self::MINUTES_IN_H * 24;
    pub const STANDARD_DATE_FORMAT: &str = "%Y-%m-%d";
    pub const STANDARD_TIME_FORMAT: &str = "%H:%M";
    // Used in output filenames e.g. eur_usd-20250210T073000Z.json
    pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

    /// Minutes elapsed since midnight for a time-of-day.
    pub fn minutes_of_day(t: NaiveTime) -> i64 {
        (t.hour() * 60 + t.minute()) as i64
    }

    /// Minutes from `start` to `end`, wrapping past midnight when `end` < `start`.
    pub fn wrapped_duration_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
        let start_minutes = Self::minutes_of_day(start);
        let mut end_minutes = Self::minutes_of_day(end);
        if end_minutes < start_minutes {
            end_minutes += Self::MINUTES_IN_D;
        }
        end_minutes - start_minutes
    }

    /// Half-open time-of-day membership test, midnight-wrap aware.
    pub fn time_in_window(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
        if start < end {
            start <= t && t < end
        } else {
            t >= start || t < end
        }
    }

    /// `date` at `time`, as a UTC instant.
    pub fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        date.and_time(time).and_utc()
    }

    /// Whole days between two instants (zero if `later` is before `earlier`).
    pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        (later - earlier).num_days().max(0)
    }

    /// Next occurrence (today or tomorrow) of `time` at or after `now`.
    pub fn next_occurrence(now: DateTime<Utc>, time: NaiveTime) -> DateTime<Utc> {
        let today = Self::at(now.date_naive(), time);
        if today < now {
            today + TimeDelta::days(1)
        } else {
            today
        }
    }

    /// Parse the timestamp formats seen in candle exports.
    /// Accepts RFC 3339, `YYYY-mm-dd HH:MM:SS`, `YYYY-mm-ddTHH:MM:SS` and `YYYY-mm-dd HH:MM`.
    pub fn parse_utc_timestamp(text: &str) -> Result<DateTime<Utc>> {
        let trimmed = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }
        const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| anyhow!("Unrecognised timestamp: '{}'", trimmed))
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(TimeUtils::STANDARD_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn wrapped_window_membership() {
        assert!(TimeUtils::time_in_window(hm(23, 30), hm(22, 0), hm(2, 0)));
        assert!(TimeUtils::time_in_window(hm(1, 59), hm(22, 0), hm(2, 0)));
        assert!(!TimeUtils::time_in_window(hm(2, 0), hm(22, 0), hm(2, 0)));
        assert!(TimeUtils::time_in_window(hm(8, 0), hm(8, 0), hm(16, 0)));
        assert!(!TimeUtils::time_in_window(hm(16, 0), hm(8, 0), hm(16, 0)));
    }

    #[test]
    fn wrapped_duration() {
        assert_eq!(TimeUtils::wrapped_duration_minutes(hm(8, 0), hm(16, 0)), 480);
        assert_eq!(TimeUtils::wrapped_duration_minutes(hm(22, 0), hm(2, 0)), 240);
    }

    #[test]
    fn parses_common_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 10)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap()
            .and_utc();
        for text in [
            "2025-02-10T07:05:00Z",
            "2025-02-10 07:05:00",
            "2025-02-10T07:05:00",
            "2025-02-10 07:05",
        ] {
            assert_eq!(TimeUtils::parse_utc_timestamp(text).unwrap(), expected);
        }
        assert!(TimeUtils::parse_utc_timestamp("10/02/2025").is_err());
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow() {
        let now = TimeUtils::at(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(), hm(9, 0));
        assert_eq!(TimeUtils::next_occurrence(now, hm(13, 0)).date_naive(), now.date_naive());
        assert_eq!(
            TimeUtils::next_occurrence(now, hm(8, 0)).date_naive(),
            now.date_naive().succ_opt().unwrap()
        );
    }
}
