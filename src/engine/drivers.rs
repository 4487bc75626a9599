use chrono::TimeDelta;
use serde::Serialize;

use crate::analysis::PatternMatchResult;
use crate::data::MacroEvent;
use crate::data::calendar::format_event_for_driver;
use crate::domain::SessionWindow;
use crate::utils::TimeUtils;

pub const NO_LIVE_DATA_DRIVER: &str = "No real-time data available; using session baseline";

/// Why a request counts as having a catalyst nearby
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventContext {
    /// Found by the calendar around the session start
    Calendar(MacroEvent),
    /// Flagged by the caller on the request
    Manual {
        label: String,
        overlap: Option<String>,
    },
}

impl EventContext {
    pub fn driver(&self, session_name: &str) -> String {
        match self {
            EventContext::Calendar(event) => format_event_for_driver(event),
            EventContext::Manual {
                label,
                overlap: Some(overlap),
            } => format!("{} scheduled during {} overlap", label, overlap),
            EventContext::Manual {
                label,
                overlap: None,
            } => format!("{} scheduled during {}", label, session_name),
        }
    }
}

/// Describes how today's pre-session range compares with its average
pub fn compression_driver(
    current_pre_range: f64,
    avg_pre_range: f64,
    compression_ratio: f64,
    is_compressed: bool,
) -> String {
    if is_compressed {
        format!(
            "Pre-session range compressed ({:.0} pips vs 30-day avg of {:.0} pips)",
            current_pre_range, avg_pre_range
        )
    } else {
        format!(
            "Pre-session range at {:.0} pips ({:.0}% of 30-day avg)",
            current_pre_range,
            compression_ratio * 100.0
        )
    }
}

/// Lead driver when today's pre-session window holds no range yet
pub fn pending_pre_session_driver(window: &SessionWindow, minutes_before: i64) -> String {
    let opens = window.start - TimeDelta::minutes(minutes_before);
    format!(
        "Pre-session window ({}-{} UTC) has not formed yet; using historical session average",
        opens.format(TimeUtils::STANDARD_TIME_FORMAT),
        window.start.format(TimeUtils::STANDARD_TIME_FORMAT)
    )
}

/// Historical-analog statement selected by expansion rate alone
pub fn pattern_driver(pattern: &PatternMatchResult) -> String {
    let rate = pattern.expansion_rate;
    let occurrences = pattern.occurrence_count;
    if rate > 0.6 {
        // Whole percent, truncated
        let pct = (rate * 100.0).trunc() as i64;
        format!(
            "Pre-session positioning historically precedes volatility expansion (observed in {}% of {} similar days)",
            pct, occurrences
        )
    } else if rate < 0.4 {
        format!(
            "Similar conditions historically resulted in range-bound action ({} historical occurrences)",
            occurrences
        )
    } else {
        format!(
            "Historical data shows mixed outcomes for similar conditions ({} comparable days)",
            occurrences
        )
    }
}

/// Ordered drivers: compression (or the no-data notice), event, historical pattern.
pub fn build_drivers(
    lead: String,
    event: Option<&EventContext>,
    session_name: &str,
    pattern: &PatternMatchResult,
) -> Vec<String> {
    let mut drivers = Vec::with_capacity(3);
    drivers.push(lead);
    if let Some(event) = event {
        drivers.push(event.driver(session_name));
    }
    drivers.push(pattern_driver(pattern));
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pattern(rate: f64, count: usize) -> PatternMatchResult {
        PatternMatchResult {
            occurrence_count: count,
            expansion_rate: rate,
            avg_expansion_pips: 0.0,
            matched_dates: Vec::new(),
        }
    }

    #[test]
    fn compression_wording() {
        assert_eq!(
            compression_driver(18.0, 32.0, 0.56, true),
            "Pre-session range compressed (18 pips vs 30-day avg of 32 pips)"
        );
        assert_eq!(
            compression_driver(30.0, 32.0, 0.94, false),
            "Pre-session range at 30 pips (94% of 30-day avg)"
        );
    }

    #[test]
    fn pending_window_names_its_hours() {
        let london = crate::domain::TradingSession::London.window();
        assert_eq!(
            pending_pre_session_driver(&london, 90),
            "Pre-session window (06:30-08:00 UTC) has not formed yet; using historical session average"
        );
        let asian = crate::domain::TradingSession::Asian.window();
        assert!(pending_pre_session_driver(&asian, 90).starts_with("Pre-session window (22:30-00:00 UTC)"));
    }

    #[test]
    fn pattern_wording_by_rate() {
        assert_eq!(
            pattern_driver(&pattern(0.63, 16)),
            "Pre-session positioning historically precedes volatility expansion (observed in 63% of 16 similar days)"
        );
        assert!(pattern_driver(&pattern(0.625, 8)).contains("observed in 62% of 8 similar days"));
        assert!(pattern_driver(&pattern(0.29, 7)).starts_with("Similar conditions historically resulted"));
        assert!(pattern_driver(&pattern(0.5, 0)).ends_with("(0 comparable days)"));
    }

    #[test]
    fn event_drivers() {
        let manual = EventContext::Manual {
            label: "ECB".to_string(),
            overlap: Some("NY".to_string()),
        };
        assert_eq!(manual.driver("London Session"), "ECB scheduled during NY overlap");
        let manual = EventContext::Manual {
            label: "BOE".to_string(),
            overlap: None,
        };
        assert_eq!(manual.driver("London Session"), "BOE scheduled during London Session");

        let calendar = EventContext::Calendar(MacroEvent {
            name: "Non-Farm Payrolls".to_string(),
            time: Utc.with_ymd_and_hms(2025, 2, 7, 13, 30, 0).unwrap(),
            country: "US".to_string(),
            currency: "USD".to_string(),
        });
        let drivers = build_drivers("lead".to_string(), Some(&calendar), "NY", &pattern(0.5, 3));
        assert_eq!(drivers.len(), 3);
        assert_eq!(drivers[1], "Non-Farm Payrolls scheduled during London-NY overlap");
    }
}
