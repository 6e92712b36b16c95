use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use tracing::{info, instrument};

use crate::error::{CoreError, CoreResult};

use super::summary::Report;

/// Destination of finished run reports.
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    /// Appends `report` stamped with `now`.
    fn append(&self, now: DateTime<Local>, report: &Report) -> CoreResult<()>;
}

/// Keeps one markdown file per calendar day, e.g. `Sat, 17 Oct 2026.md`. Files are only ever
/// appended to.
pub struct DailyLogFile {
    dir: PathBuf,
}

impl DailyLogFile {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, now: DateTime<Local>) -> PathBuf {
        self.dir.join(log_file_name(now))
    }
}

impl LogSink for DailyLogFile {
    fn append(&self, now: DateTime<Local>, report: &Report) -> CoreResult<()> {
        persist_log(&self.dir, now, report).map(|_| ())
    }
}

pub fn log_file_name(now: DateTime<Local>) -> String {
    now.format("%a, %-d %b %Y.md").to_string()
}

/// A report preceded by a separator and a header with the time of day.
pub fn render_log_entry(now: DateTime<Local>, report: &Report) -> String {
    format!(
        "\n---\n\n## Session - {}\n{report}",
        now.format("%H:%M:%S")
    )
}

/// Appends the report to the log file of the day `now` falls on.
#[instrument(skip(report))]
pub fn persist_log(dir: &Path, now: DateTime<Local>, report: &Report) -> CoreResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| CoreError::store(dir, e))?;
    let path = dir.join(log_file_name(now));

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|e| CoreError::store(&path, e))?;
    file.write_all(render_log_entry(now, report).as_bytes())
        .map_err(|e| CoreError::store(&path, e))?;

    info!("Saved session log to {path:?}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
    use tempfile::tempdir;

    use crate::{
        routine::summary::{Report, ReportEntry},
        store::routines::ChecklistItem,
    };

    use super::{log_file_name, DailyLogFile, LogSink};

    fn local(d: u32, h: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 5, 9)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn report() -> Report {
        Report {
            entries: vec![ReportEntry {
                title: "stretch".into(),
                time_spent: Duration::seconds(75),
                checklist: vec![ChecklistItem::new("neck")],
            }],
            total_paused: Duration::zero(),
        }
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name(local(17, 9)), "Sat, 17 Oct 2026.md");
        assert_eq!(log_file_name(local(5, 9)), "Mon, 5 Oct 2026.md");
    }

    #[test]
    fn test_daily_log_appends() -> Result<()> {
        let dir = tempdir()?;
        let sink = DailyLogFile::new(dir.path().join("logging"));

        sink.append(local(17, 9), &report())?;
        sink.append(local(17, 18), &report())?;
        sink.append(local(18, 7), &report())?;

        let today = fs::read_to_string(sink.path_for(local(17, 9)))?;
        assert_eq!(today.matches("\n---\n\n## Session - ").count(), 2);
        assert!(today.starts_with(
            "\n---\n\n## Session - 09:05:09\n### Stretch\nTime Spent: 1m15s\n\nChecklist:\n- [ ] neck\n"
        ));
        assert!(today.contains("## Session - 18:05:09"));

        let tomorrow = fs::read_to_string(sink.path_for(local(18, 7)))?;
        assert_eq!(tomorrow.matches("## Session").count(), 1);
        Ok(())
    }
}
