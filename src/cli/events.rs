use std::{fmt::Display, io::Write};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    events::{event_views, EventView},
    store::events::load_events,
    utils::dir::DataLayout,
};

use super::{style, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct EventsCommand {
    #[arg(
        long = "at",
        help = "Moment the countdowns are computed from. Examples are \"tomorrow\", \"in 3 days\", \"15/03/2027\", \"12:00 16/03/2027\""
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print events as JSON")]
    json: bool,
}

/// Lists every event with the countdown to its next occurrence.
pub fn process_events_command(
    EventsCommand {
        at,
        date_style,
        json,
    }: EventsCommand,
    layout: &DataLayout,
) -> Result<()> {
    let reference = parse_reference(at, date_style)?;
    let events = load_events(&layout.events_file(), reference)?;
    let views = event_views(&events, reference);

    let mut out = std::io::stdout();
    if json {
        serde_json::to_writer_pretty(&mut out, &views)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", style::heading("Events"))?;
        write!(out, "{}", render_events(&views))?;
    }
    Ok(())
}

fn parse_reference(at: Option<String>, date_style: DateStyle) -> Result<NaiveDateTime> {
    let now = Local::now();
    match at.map(|s| parse_date_string(&s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.naive_local()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate reference date {e}"),
            )
            .into()),
        None => Ok(now.naive_local()),
    }
}

/// One line per event: countdown, name and when it happens next.
pub fn render_events(views: &[EventView]) -> String {
    if views.is_empty() {
        return format!("{}\n", style::muted("No events yet. Add one with add-event."));
    }
    views
        .iter()
        .map(|view| {
            format!(
                "{}\t{}\t{}\n",
                view.countdown,
                view.display_name,
                view.next_occurrence.format("%a %-d %b %Y %H:%M")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::events::{event_views, Event, Repeat};

    use super::render_events;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_render_events() {
        let events = vec![Event {
            name: "Standup".into(),
            date_time: at(1, 9),
            repeat: Repeat::Weekly,
            code_phrase: None,
        }];
        let rendered = render_events(&event_views(&events, at(17, 12)));
        assert_eq!(rendered, "4 d\tStandup\tThu 22 Oct 2026 09:00\n");
    }

    #[test]
    fn test_json_uses_repeat_text() -> anyhow::Result<()> {
        let events = vec![Event {
            name: "Launch".into(),
            date_time: at(20, 9),
            repeat: Repeat::Never,
            code_phrase: Some("Rocket".into()),
        }];
        let json = serde_json::to_value(event_views(&events, at(17, 12)))?;
        assert_eq!(json[0]["display_name"], "Rocket");
        assert_eq!(json[0]["repeat"], "");
        assert_eq!(json[0]["next_occurrence"], "2026-10-20T09:00:00");
        Ok(())
    }
}
