use std::fmt::Display;

use chrono::{Days, Months, NaiveDateTime};
use serde::{Serialize, Serializer};

use super::Event;

/// How often an event comes back.
///
/// Unknown text read from a store is kept in [Repeat::Unrecognized] so that it can be written
/// back unchanged. Such events behave like [Repeat::Never].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Unrecognized(String),
}

impl Repeat {
    /// Reads the free text of a `Repeat:` attribute. Matching is case-insensitive and both an
    /// empty value and `none` mean the event doesn't repeat.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.to_lowercase().as_str() {
            "" | "none" => Repeat::Never,
            "daily" => Repeat::Daily,
            "weekly" => Repeat::Weekly,
            "monthly" => Repeat::Monthly,
            "yearly" => Repeat::Yearly,
            _ => Repeat::Unrecognized(text.to_string()),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Repeat::Never)
    }

    /// Moves `time` forward by one period. `None` for policies that never advance or when the
    /// calendar runs out.
    ///
    /// Monthly steps are calendar months: a day that doesn't exist in the next month is clamped
    /// to that month's last day, and later steps continue from the clamped day.
    pub fn advance(&self, time: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Repeat::Daily => time.checked_add_days(Days::new(1)),
            Repeat::Weekly => time.checked_add_days(Days::new(7)),
            Repeat::Monthly => time.checked_add_months(Months::new(1)),
            Repeat::Yearly => time.checked_add_months(Months::new(12)),
            Repeat::Never | Repeat::Unrecognized(_) => None,
        }
    }
}

impl Display for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repeat::Never => Ok(()),
            Repeat::Daily => write!(f, "daily"),
            Repeat::Weekly => write!(f, "weekly"),
            Repeat::Monthly => write!(f, "monthly"),
            Repeat::Yearly => write!(f, "yearly"),
            Repeat::Unrecognized(text) => write!(f, "{text}"),
        }
    }
}

impl Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// First occurrence of `event` at or after `reference`.
///
/// Events that don't repeat always return their own time, even when it already passed.
pub fn next_occurrence(event: &Event, reference: NaiveDateTime) -> NaiveDateTime {
    let mut next = event.date_time;
    while next < reference {
        match event.repeat.advance(next) {
            Some(advanced) => next = advanced,
            None => return event.date_time,
        }
    }
    next
}
