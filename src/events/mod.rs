//! Recurring events and their countdowns.
//!
//! Events are stored in `events/events.md` (see [crate::store::events]). The countdown shown for
//! an event is computed from its next occurrence, see [recurrence::next_occurrence].

pub mod builder;
pub mod recurrence;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

pub use recurrence::{next_occurrence, Repeat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub date_time: NaiveDateTime,
    pub repeat: Repeat,
    pub code_phrase: Option<String>,
}

impl Event {
    /// Name shown to the user. A code phrase hides the real name of the event.
    pub fn display_name(&self) -> &str {
        match self.code_phrase.as_deref() {
            Some(phrase) if !phrase.is_empty() => phrase,
            _ => &self.name,
        }
    }
}

/// Snapshot of an event relative to a reference time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub name: String,
    pub display_name: String,
    pub repeat: Repeat,
    pub next_occurrence: NaiveDateTime,
    pub countdown: String,
}

impl EventView {
    pub fn new(event: &Event, now: NaiveDateTime) -> Self {
        let next = next_occurrence(event, now);
        Self {
            name: event.name.clone(),
            display_name: event.display_name().to_string(),
            repeat: event.repeat.clone(),
            next_occurrence: next,
            countdown: format_countdown(next - now),
        }
    }
}

/// Views of all events in store order.
pub fn event_views(events: &[Event], now: NaiveDateTime) -> Vec<EventView> {
    events.iter().map(|event| EventView::new(event, now)).collect()
}

/// Compact countdown using only the largest units, e.g. `3 d`, `4 h 10 m`, `12 m 5 s`.
/// Anything not in the future reads `0 d ago`.
pub fn format_countdown(remaining: Duration) -> String {
    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    let seconds = remaining.num_seconds() % 60;

    if days > 0 {
        format!("{days} d")
    } else if hours > 0 {
        format!("{hours} h {minutes} m")
    } else if minutes > 0 {
        format!("{minutes} m {seconds} s")
    } else if seconds > 0 {
        format!("{seconds} s")
    } else {
        "0 d ago".to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::{event_views, format_countdown, Event, Repeat};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::days(3) + Duration::hours(5)), "3 d");
        assert_eq!(
            format_countdown(Duration::hours(4) + Duration::minutes(10)),
            "4 h 10 m"
        );
        assert_eq!(
            format_countdown(Duration::minutes(12) + Duration::seconds(5)),
            "12 m 5 s"
        );
        assert_eq!(format_countdown(Duration::seconds(9)), "9 s");
        assert_eq!(format_countdown(Duration::zero()), "0 d ago");
        assert_eq!(format_countdown(-Duration::days(2)), "0 d ago");
    }

    #[test]
    fn test_event_views_use_code_phrase() {
        let events = vec![
            Event {
                name: "Anniversary".into(),
                date_time: at(20, 18),
                repeat: Repeat::Yearly,
                code_phrase: Some("Big day".into()),
            },
            Event {
                name: "Standup".into(),
                date_time: at(1, 9),
                repeat: Repeat::Daily,
                code_phrase: None,
            },
        ];
        let views = event_views(&events, at(17, 12));

        assert_eq!(views[0].display_name, "Big day");
        assert_eq!(views[0].countdown, "3 d");
        assert_eq!(views[1].display_name, "Standup");
        assert_eq!(views[1].next_occurrence, at(18, 9));
        assert_eq!(views[1].countdown, "21 h 0 m");
    }
}
