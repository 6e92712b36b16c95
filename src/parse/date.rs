use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CoreError, CoreResult};

/// Format used when writing event times back into the store.
pub const EVENT_TIME_FORMAT: &str = "%-d %B %Y %H:%M";

struct Layout {
    format: &'static str,
    has_year: bool,
    has_time: bool,
}

const fn layout(format: &'static str, has_year: bool, has_time: bool) -> Layout {
    Layout {
        format,
        has_year,
        has_time,
    }
}

/// Most specific first. The first layout matching the whole input wins.
const LAYOUTS: [Layout; 8] = [
    layout("%d %B %Y %H:%M", true, true),
    layout("%d %B %Y", true, false),
    layout("%d %B %H:%M", false, true),
    layout("%d %B", false, false),
    layout("%d %b %Y %H:%M", true, true),
    layout("%d %b %H:%M", false, true),
    layout("%d %b %Y", true, false),
    layout("%d %b", false, false),
];

/// Parses dates like `17 August 2025 15:00`, `17 Aug` or `3 March 09:30`.
///
/// Inputs without a year land in the calendar year of `now`, which the caller supplies.
pub fn parse_date(text: &str, now: NaiveDateTime) -> CoreResult<NaiveDateTime> {
    let text = text.trim();
    let year = now.year();

    LAYOUTS
        .iter()
        .find_map(|layout| parse_with(layout, text, year))
        .ok_or_else(|| CoreError::UnparseableDate(text.to_string()))
}

fn parse_with(layout: &Layout, text: &str, year: i32) -> Option<NaiveDateTime> {
    let (input, format) = if layout.has_year {
        (text.to_string(), layout.format.to_string())
    } else {
        // chrono refuses dates without a year, so the year is supplied explicitly
        (format!("{text} {year}"), format!("{} %Y", layout.format))
    };

    if layout.has_time {
        NaiveDateTime::parse_from_str(&input, &format).ok()
    } else {
        NaiveDate::parse_from_str(&input, &format)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN))
    }
}
