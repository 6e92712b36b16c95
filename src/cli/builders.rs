use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDateTime;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::{
    events::{builder::EventBuilder, Event},
    routine::builder::RoutineBuilder,
    store::events::save_event_to_file,
};

use super::style;

fn prompt(out: &mut impl Write, text: &str, error: Option<&str>) -> Result<()> {
    if let Some(error) = error {
        writeln!(out, "{}", style::problem(error))?;
    }
    write!(out, "{} ", style::heading(text))?;
    out.flush()?;
    Ok(())
}

/// Asks for a routine line by line and writes it into `routines_dir`. `None` when the input
/// ends before the routine is finished.
pub async fn build_routine<R, W>(input: R, out: &mut W, routines_dir: &Path) -> Result<Option<PathBuf>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut builder = RoutineBuilder::new();
    loop {
        prompt(out, builder.prompt(), builder.error())?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            writeln!(out, "{}", style::muted("Routine discarded."))?;
            return Ok(None);
        };
        if let Some(draft) = builder.submit(&line) {
            let path = draft.save(routines_dir)?;
            writeln!(out)?;
            write!(out, "{builder}")?;
            writeln!(out, "{} {}", builder.prompt(), style::muted(&path.display().to_string()))?;
            return Ok(Some(path));
        }
    }
}

/// Asks for an event line by line and appends it to the event store at `events_file`.
pub async fn build_event<R, W>(
    input: R,
    out: &mut W,
    events_file: &Path,
    now: NaiveDateTime,
) -> Result<Option<Event>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut builder = EventBuilder::new();
    loop {
        prompt(out, builder.prompt(), builder.error())?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            writeln!(out, "{}", style::muted("Event discarded."))?;
            return Ok(None);
        };
        if let Some(event) = builder.submit(&line, now) {
            let index = save_event_to_file(events_file, &event)?;
            info!("Saved event {:?} as number {index}", event.name);
            writeln!(out)?;
            write!(out, "{}", builder.preview())?;
            writeln!(out, "{}", builder.prompt())?;
            return Ok(Some(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::tempdir;

    use crate::{
        events::Repeat,
        store::{events::load_events, routines::load_routines},
    };

    use super::{build_event, build_routine};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_routine_from_lines() -> Result<()> {
        let dir = tempdir()?;
        let input = &b"Wind Down\nTea\nsoon\n5m\n\nboil water\ndone\ndone\n"[..];
        let mut out = vec![];

        let path = build_routine(input, &mut out, dir.path())
            .await?
            .expect("routine should be saved");

        assert_eq!(path, dir.path().join("Wind_Down.md"));
        let routines = load_routines(&path)?;
        assert_eq!(routines.len(), 1);
        assert_eq!(routines[0].time, "5m");
        assert_eq!(routines[0].checklist[0].text, "boil water");
        assert!(fs::read_to_string(&path)?.starts_with("# Wind Down\n"));

        let printed = String::from_utf8(out)?;
        assert!(printed.contains("no numeric value found in duration"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unfinished_routine_is_not_written() -> Result<()> {
        let dir = tempdir()?;
        let mut out = vec![];
        let saved = build_routine(&b"Wind Down\nTea\n"[..], &mut out, dir.path()).await?;
        assert!(saved.is_none());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_event_appends() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("events").join("events.md");
        fs::create_dir_all(dir.path().join("events"))?;
        fs::write(&file, "1. Event Name: Old\n- Time: 1 January 2026 10:00\n")?;

        let mut out = vec![];
        let event = build_event(
            &b"Party\n31 December 2026 20:00\nyearly\nnone\n"[..],
            &mut out,
            &file,
            now(),
        )
        .await?
        .expect("event should be saved");
        assert_eq!(event.repeat, Repeat::Yearly);

        let events = load_events(&file, now())?;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], event);
        assert!(fs::read_to_string(&file)?.contains("2. Event Name: Party\n"));
        Ok(())
    }
}
