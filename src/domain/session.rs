use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};

use crate::config::sessions::SessionHours;
use crate::config::{SESSIONS, WEEKEND};
use crate::error::AnalysisError;
use crate::utils::TimeUtils;

/// Named window of the trading day (UTC). May wrap midnight when `start` > `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(name: &str, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
        }
    }

    fn from_hours(hours: &SessionHours) -> Self {
        Self::new(hours.name, hm(hours.start), hm(hours.end))
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        TimeUtils::time_in_window(t, self.start, self.end)
    }

    pub fn duration_minutes(&self) -> i64 {
        TimeUtils::wrapped_duration_minutes(self.start, self.end)
    }
}

/// (hour, minute) config pair to a time-of-day. Config values are always valid clock times.
fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
    strum_macros::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum TradingSession {
    #[strum(to_string = "asian", serialize = "tokyo")]
    Asian,
    #[strum(to_string = "london", serialize = "london open")]
    London,
    #[strum(to_string = "ny", serialize = "new york", serialize = "newyork", serialize = "new_york")]
    NewYork,
}

impl TradingSession {
    pub fn window(&self) -> SessionWindow {
        match self {
            TradingSession::Asian => SessionWindow::from_hours(&SESSIONS.asian),
            TradingSession::London => SessionWindow::from_hours(&SESSIONS.london),
            TradingSession::NewYork => SessionWindow::from_hours(&SESSIONS.new_york),
        }
    }

    /// First session (in table order) whose window contains `now`.
    pub fn active_at(now: DateTime<Utc>) -> Option<Self> {
        Self::iter().find(|s| s.window().contains(now.time()))
    }

    /// Next session to start strictly after `now`, with its start instant.
    /// After the last start of the day this is tomorrow's Asian session.
    pub fn next_after(now: DateTime<Utc>) -> (Self, DateTime<Utc>) {
        let today = now.date_naive();
        Self::iter()
            .map(|s| (s, TimeUtils::at(today, s.window().start)))
            .find(|(_, start)| now.time() < start.time())
            .unwrap_or_else(|| {
                let tomorrow = today + TimeDelta::days(1);
                let first = TradingSession::Asian;
                (first, TimeUtils::at(tomorrow, first.window().start))
            })
    }

    /// Next start of this session at or after `now` (today if not yet passed, else tomorrow).
    pub fn next_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeUtils::next_occurrence(now, self.window().start)
    }
}

/// Which session the caller wants analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionSelector {
    #[default]
    Auto,
    Named(TradingSession),
}

impl SessionSelector {
    /// Resolve "auto" to the active session, or the next one when none is active.
    pub fn resolve(&self, now: DateTime<Utc>) -> TradingSession {
        match self {
            SessionSelector::Named(session) => *session,
            SessionSelector::Auto => {
                TradingSession::active_at(now).unwrap_or_else(|| TradingSession::next_after(now).0)
            }
        }
    }
}

impl FromStr for SessionSelector {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(SessionSelector::Auto);
        }
        TradingSession::from_str(trimmed)
            .map(SessionSelector::Named)
            .map_err(|_| AnalysisError::InvalidSession(trimmed.to_string()))
    }
}

/// Forex closes Friday 21:00 UTC and reopens Sunday 22:00 UTC.
pub fn is_weekend(now: DateTime<Utc>) -> bool {
    let t = now.time();
    match now.weekday() {
        Weekday::Fri => t >= hm(WEEKEND.close),
        Weekday::Sat => true,
        Weekday::Sun => t < hm(WEEKEND.reopen),
        _ => false,
    }
}

/// Label for the part of the trading day an instant falls in (used in event drivers).
pub fn session_bucket(at: DateTime<Utc>) -> &'static str {
    let t = at.time();
    let overlap = SessionWindow::from_hours(&SESSIONS.london_ny_overlap);
    if overlap.contains(t) {
        return "London-NY overlap";
    }
    if TradingSession::Asian.window().contains(t) {
        "Asian session"
    } else if TradingSession::London.window().contains(t) {
        "London session"
    } else if TradingSession::NewYork.window().contains(t) {
        "NY session"
    } else {
        "off-hours"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_session_names_and_aliases() {
        assert_eq!("auto".parse::<SessionSelector>().unwrap(), SessionSelector::Auto);
        assert_eq!(
            "London".parse::<SessionSelector>().unwrap(),
            SessionSelector::Named(TradingSession::London)
        );
        assert_eq!(
            "new york".parse::<SessionSelector>().unwrap(),
            SessionSelector::Named(TradingSession::NewYork)
        );
        assert_eq!(
            "TOKYO".parse::<SessionSelector>().unwrap(),
            SessionSelector::Named(TradingSession::Asian)
        );
        assert!(matches!(
            "sydney".parse::<SessionSelector>(),
            Err(AnalysisError::InvalidSession(_))
        ));
        assert_eq!(TradingSession::NewYork.to_string(), "ny");
    }

    #[test]
    fn auto_prefers_active_session_in_table_order() {
        // 08:30 sits in both Asian and London; Asian comes first in the table
        let now = utc(2025, 2, 10, 8, 30);
        assert_eq!(SessionSelector::Auto.resolve(now), TradingSession::Asian);
        let now = utc(2025, 2, 10, 14, 0);
        assert_eq!(SessionSelector::Auto.resolve(now), TradingSession::London);
    }

    #[test]
    fn auto_falls_back_to_next_session_when_closed() {
        let now = utc(2025, 2, 10, 22, 15);
        assert_eq!(TradingSession::active_at(now), None);
        let (next, start) = TradingSession::next_after(now);
        assert_eq!(next, TradingSession::Asian);
        assert_eq!(start, utc(2025, 2, 11, 0, 0));
        assert_eq!(SessionSelector::Auto.resolve(now), TradingSession::Asian);
    }

    #[test]
    fn weekend_closure_window() {
        // 2025-02-14 is a Friday
        assert!(!is_weekend(utc(2025, 2, 14, 20, 59)));
        assert!(is_weekend(utc(2025, 2, 14, 21, 0)));
        assert!(is_weekend(utc(2025, 2, 15, 12, 0)));
        assert!(is_weekend(utc(2025, 2, 16, 21, 59)));
        assert!(!is_weekend(utc(2025, 2, 16, 22, 0)));
        assert!(!is_weekend(utc(2025, 2, 12, 3, 0)));
    }

    #[test]
    fn session_durations() {
        assert_eq!(TradingSession::Asian.window().duration_minutes(), 540);
        assert_eq!(TradingSession::London.window().duration_minutes(), 480);
        let wrapped = SessionWindow::new("Late", hm((22, 0)), hm((2, 0)));
        assert_eq!(wrapped.duration_minutes(), 240);
        assert!(wrapped.contains(hm((23, 0))));
    }

    #[test]
    fn event_time_buckets() {
        assert_eq!(session_bucket(utc(2025, 2, 10, 3, 0)), "Asian session");
        assert_eq!(session_bucket(utc(2025, 2, 10, 10, 0)), "London session");
        assert_eq!(session_bucket(utc(2025, 2, 10, 14, 30)), "London-NY overlap");
        assert_eq!(session_bucket(utc(2025, 2, 10, 18, 0)), "NY session");
        assert_eq!(session_bucket(utc(2025, 2, 10, 22, 0)), "off-hours");
    }

    #[test]
    fn next_start_rolls_over() {
        let now = utc(2025, 2, 10, 9, 0);
        assert_eq!(TradingSession::NewYork.next_start(now), utc(2025, 2, 10, 13, 0));
        assert_eq!(TradingSession::London.next_start(now), utc(2025, 2, 11, 8, 0));
    }
}
