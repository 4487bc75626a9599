use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HIGH_IMPACT_KEYWORDS;
use crate::domain::session_bucket;
use crate::utils::TimeUtils;

/// A scheduled high-impact macroeconomic release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroEvent {
    pub name: String,
    pub time: DateTime<Utc>,
    pub country: String,
    pub currency: String,
}

/// Result of a calendar lookup. `Unavailable` is treated as "no event" by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum EventLookup {
    Found(MacroEvent),
    NoEvent,
    Unavailable(String),
}

impl EventLookup {
    pub fn event(&self) -> Option<&MacroEvent> {
        match self {
            EventLookup::Found(event) => Some(event),
            _ => None,
        }
    }
}

#[async_trait]
pub trait EventCalendar: Send + Sync {
    /// First high-impact event within `window_minutes` either side of `target`.
    async fn nearby_event(&self, target: DateTime<Utc>, window_minutes: i64) -> EventLookup;

    /// Dates with at least one listed event; used for event-day statistics.
    async fn event_dates(&self) -> Vec<NaiveDate> {
        Vec::new()
    }
}

/// Case-insensitive keyword match against the high-impact list.
pub fn is_high_impact(event_name: &str) -> bool {
    let upper = event_name.to_uppercase();
    HIGH_IMPACT_KEYWORDS
        .iter()
        .any(|keyword| upper.contains(&keyword.to_uppercase()))
}

/// Driver text, e.g. "FOMC Interest Rate Decision scheduled during NY session"
pub fn format_event_for_driver(event: &MacroEvent) -> String {
    let name = match event.name.trim() {
        "" => "Economic event",
        name => name,
    };
    format!("{} scheduled during {}", name, session_bucket(event.time))
}

/// Row format of a calendar export
#[derive(Debug, Deserialize)]
struct CalendarRecord {
    event: String,
    datetime: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    currency: String,
}

/// An in-memory list of high-impact events, in time order.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    events: Vec<MacroEvent>,
}

impl StaticCalendar {
    /// Keeps only high-impact events.
    pub fn new(mut events: Vec<MacroEvent>) -> Self {
        events.retain(|e| is_high_impact(&e.name));
        events.sort_by_key(|e| e.time);
        Self { events }
    }

    /// Load a JSON array of `{event, datetime, country, currency}` records.
    /// Rows with an unreadable datetime are skipped.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read calendar file: {:?}", path))?;
        Self::from_json(&text).context(format!("Failed to parse calendar file: {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let records: Vec<CalendarRecord> = serde_json::from_str(text)?;
        let events = records
            .into_iter()
            .filter_map(|r| match TimeUtils::parse_utc_timestamp(&r.datetime) {
                Ok(time) => Some(MacroEvent {
                    name: r.event,
                    time,
                    country: r.country,
                    currency: r.currency,
                }),
                Err(e) => {
                    log::warn!("Skipping calendar entry '{}': {}", r.event, e);
                    None
                }
            })
            .collect();
        Ok(Self::new(events))
    }

    pub fn events(&self) -> &[MacroEvent] {
        &self.events
    }

    fn find_near(&self, target: DateTime<Utc>, window_minutes: i64) -> Option<&MacroEvent> {
        let window = TimeDelta::minutes(window_minutes);
        self.events
            .iter()
            .find(|e| (e.time - target).abs() <= window)
    }
}

#[async_trait]
impl EventCalendar for StaticCalendar {
    async fn nearby_event(&self, target: DateTime<Utc>, window_minutes: i64) -> EventLookup {
        match self.find_near(target, window_minutes) {
            Some(event) => EventLookup::Found(event.clone()),
            None => EventLookup::NoEvent,
        }
    }

    async fn event_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.events.iter().map(|e| e.time.date_naive()).collect();
        dates.dedup();
        dates
    }
}

/// Re-reads a JSON calendar file on every lookup; read failures report `Unavailable`.
#[derive(Debug, Clone)]
pub struct JsonFileCalendar {
    path: PathBuf,
}

impl JsonFileCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<StaticCalendar> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .context(format!("Failed to read calendar file: {:?}", self.path))?;
        StaticCalendar::from_json(&text)
            .context(format!("Failed to parse calendar file: {:?}", self.path))
    }
}

#[async_trait]
impl EventCalendar for JsonFileCalendar {
    async fn nearby_event(&self, target: DateTime<Utc>, window_minutes: i64) -> EventLookup {
        match self.load().await {
            Ok(calendar) => calendar.nearby_event(target, window_minutes).await,
            Err(e) => EventLookup::Unavailable(format!("{:#}", e)),
        }
    }

    async fn event_dates(&self) -> Vec<NaiveDate> {
        match self.load().await {
            Ok(calendar) => calendar.event_dates().await,
            Err(_) => Vec::new(),
        }
    }
}

/// Calendar with nothing scheduled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalendar;

#[async_trait]
impl EventCalendar for NoCalendar {
    async fn nearby_event(&self, _target: DateTime<Utc>, _window_minutes: i64) -> EventLookup {
        EventLookup::NoEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EVENTS_JSON: &str = r#"[
        {"event": "FOMC Interest Rate Decision", "datetime": "2025-02-10 19:00:00", "country": "US", "currency": "USD"},
        {"event": "Retail Sales m/m", "datetime": "2025-02-10 13:30:00", "country": "US", "currency": "USD"},
        {"event": "ECB President Speech", "datetime": "2025-02-10T13:30:00Z", "country": "EU", "currency": "EUR"},
        {"event": "CPI y/y", "datetime": "not a date", "country": "GB", "currency": "GBP"}
    ]"#;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 10, h, m, 0).unwrap()
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        assert!(is_high_impact("Non-farm Payrolls"));
        assert!(is_high_impact("boj outlook report"));
        assert!(!is_high_impact("Retail Sales m/m"));
    }

    #[test]
    fn loads_and_filters_events() {
        let calendar = StaticCalendar::from_json(EVENTS_JSON).unwrap();
        let names: Vec<&str> = calendar.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ECB President Speech", "FOMC Interest Rate Decision"]);
    }

    #[tokio::test]
    async fn finds_events_within_window_either_side() {
        let calendar = StaticCalendar::from_json(EVENTS_JSON).unwrap();
        // London-NY overlap start; ECB at 13:30 is 30 minutes after
        match calendar.nearby_event(utc(13, 0), 120).await {
            EventLookup::Found(event) => assert_eq!(event.name, "ECB President Speech"),
            other => panic!("expected an event, got {:?}", other),
        }
        // 21:00 is two hours after FOMC: still inside the window
        assert!(calendar.nearby_event(utc(21, 0), 120).await.event().is_some());
        assert_eq!(calendar.nearby_event(utc(4, 0), 120).await, EventLookup::NoEvent);
        assert_eq!(
            calendar.event_dates().await,
            vec![NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()]
        );
    }

    #[test]
    fn driver_names_the_session_bucket() {
        let calendar = StaticCalendar::from_json(EVENTS_JSON).unwrap();
        let drivers: Vec<String> = calendar.events().iter().map(format_event_for_driver).collect();
        assert_eq!(drivers[0], "ECB President Speech scheduled during London-NY overlap");
        assert_eq!(drivers[1], "FOMC Interest Rate Decision scheduled during NY session");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable_not_fatal() {
        let calendar = JsonFileCalendar::new("/nonexistent/calendar.json");
        assert!(matches!(
            calendar.nearby_event(utc(13, 0), 120).await,
            EventLookup::Unavailable(_)
        ));
        assert!(calendar.event_dates().await.is_empty());
        assert_eq!(NoCalendar.nearby_event(utc(13, 0), 120).await, EventLookup::NoEvent);
    }
}
