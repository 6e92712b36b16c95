//! The landing screen: a greeting, how much of the year, month, week and day is gone, and a
//! quote.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike};
use now::DateTimeNow;

use crate::{
    store::quotes::Quote,
    utils::{percentage::Percentage, time::truncate_to_seconds},
};

pub const BAR_CELLS: usize = 30;
const FILLED_CELL: &str = "■";
const EMPTY_CELL: &str = "□";

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good morning!",
        12..18 => "Good afternoon!",
        _ => "Good evening!",
    }
}

/// Greeting, the date and the four progress bars.
pub fn greet<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut text = format!("{}\n", greeting(now.hour()));
    text.push_str(&format!("Today is {}.\n", now.format("%A, %-d %B %Y")));
    for (name, bar) in [
        ("year", year_progress(now)),
        ("month", month_progress(now)),
        ("week", week_progress(now)),
        ("day", day_progress(now)),
    ] {
        text.push_str(&format!("\n {name} progress: {bar}\n"));
    }
    text
}

/// `"{left} days left"` followed by the bar and the floored percentage of `done / whole`.
pub fn progress_bar(done: f64, whole: f64, left: f64, in_hours: bool) -> String {
    let percentage = Percentage::of(done, whole);
    let filled = ((BAR_CELLS as f64 * *percentage / 100.) as usize).min(BAR_CELLS);
    let unit = if in_hours { "hours" } else { "days" };

    format!(
        "{left:.0} {unit} left\n [{}{}] {:.0}% ",
        FILLED_CELL.repeat(filled),
        EMPTY_CELL.repeat(BAR_CELLS - filled),
        *percentage
    )
}

pub fn year_progress<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let day = now.ordinal() as f64;
    let days_in_year = now.end_of_year().ordinal() as f64;
    progress_bar(day, days_in_year, days_in_year - day, false)
}

pub fn month_progress<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let day = now.day() as f64;
    let last_day = now.end_of_month().day() as f64;
    progress_bar(day, last_day, last_day - day, false)
}

/// Weeks start on Sunday.
pub fn week_progress<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let weekday = now.weekday().num_days_from_sunday() as f64;
    progress_bar(weekday, 7., 7. - weekday, false)
}

pub fn day_progress<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let hours = now.hour() as f64 + now.minute() as f64 / 60.;
    progress_bar(hours, 24., (24. - hours).floor(), true)
}

/// Whole seconds until 23:59:59 of the current day.
pub fn time_left_today<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    truncate_to_seconds(now.end_of_day() - now.clone())
}

/// `2d 3h 4m`, or `3h 4m` below a day.
pub fn format_time_left(left: Duration) -> String {
    let days = left.num_days();
    let hours = left.num_hours() % 24;
    let minutes = left.num_minutes() % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

pub fn fallback_quote() -> Quote {
    Quote {
        text: "Time is what we want most, but what we use worst.".into(),
        author: "William Penn".into(),
    }
}

/// Picks a quote from `seed`, the same seed always giving the same quote.
pub fn pick_quote(quotes: &[Quote], seed: u64) -> Quote {
    if quotes.is_empty() {
        return fallback_quote();
    }
    let index = (seed % quotes.len() as u64) as usize;
    quotes[index].clone()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    use crate::store::quotes::Quote;

    use super::{
        day_progress, format_time_left, greet, greeting, month_progress, pick_quote,
        progress_bar, time_left_today, week_progress, year_progress,
    };

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_greeting_boundaries() {
        assert_eq!(greeting(0), "Good morning!");
        assert_eq!(greeting(11), "Good morning!");
        assert_eq!(greeting(12), "Good afternoon!");
        assert_eq!(greeting(17), "Good afternoon!");
        assert_eq!(greeting(18), "Good evening!");
        assert_eq!(greeting(23), "Good evening!");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(
            progress_bar(1., 2., 1., false),
            format!("1 days left\n [{}{}] 50% ", "■".repeat(15), "□".repeat(15))
        );
        assert_eq!(
            progress_bar(0., 7., 7., false),
            format!("7 days left\n [{}] 0% ", "□".repeat(30))
        );
        // 2/3 floors to 66%, which is 19.8 cells
        assert!(progress_bar(2., 3., 1., true)
            .starts_with(&format!("1 hours left\n [{}□", "■".repeat(19))));
    }

    #[test]
    fn test_calendar_bars() {
        let now = at(2026, 10, 17, 18, 30);
        // 290th day of a 365 day year
        assert!(year_progress(&now).starts_with("75 days left"));
        assert!(year_progress(&now).ends_with("79% "));
        assert!(month_progress(&now).starts_with("14 days left"));
        assert!(month_progress(&now).ends_with("54% "));
        // a Saturday
        assert!(week_progress(&now).starts_with("1 days left"));
        assert!(week_progress(&now).ends_with("85% "));
        assert!(day_progress(&now).starts_with("5 hours left"));
        assert!(day_progress(&now).ends_with("77% "));

        let leap = at(2028, 12, 31, 0, 0);
        assert!(year_progress(&leap).starts_with("0 days left"));
        assert!(year_progress(&leap).ends_with("100% "));
    }

    #[test]
    fn test_greet() {
        let text = greet(&at(2026, 10, 17, 9, 0));
        assert!(text.starts_with("Good morning!\nToday is Saturday, 17 October 2026.\n"));
        let positions = ["year", "month", "week", "day"]
            .map(|name| text.find(&format!("\n {name} progress: ")).unwrap());
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(text.ends_with("% \n"));
    }

    #[test]
    fn test_time_left_today() {
        assert_eq!(
            time_left_today(&at(2026, 10, 17, 12, 0)),
            Duration::seconds(11 * 3600 + 59 * 60 + 59)
        );
        assert_eq!(time_left_today(&at(2026, 10, 17, 23, 59)), Duration::seconds(59));
    }

    #[test]
    fn test_format_time_left() {
        assert_eq!(
            format_time_left(Duration::days(2) + Duration::hours(3) + Duration::minutes(4)),
            "2d 3h 4m"
        );
        assert_eq!(format_time_left(Duration::minutes(65)), "1h 5m");
        assert_eq!(format_time_left(Duration::seconds(30)), "0h 0m");
    }

    #[test]
    fn test_pick_quote() {
        let quotes = vec![
            Quote {
                text: "a".into(),
                author: "A".into(),
            },
            Quote {
                text: "b".into(),
                author: "B".into(),
            },
        ];
        assert_eq!(pick_quote(&quotes, 0).text, "a");
        assert_eq!(pick_quote(&quotes, 3).text, "b");
        assert_eq!(pick_quote(&quotes, 3), pick_quote(&quotes, 3));
        assert_eq!(pick_quote(&[], 7).author, "William Penn");
    }
}
