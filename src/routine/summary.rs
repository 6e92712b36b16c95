use std::{collections::HashMap, fmt::Display};

use chrono::Duration;

use crate::{
    store::routines::{ChecklistItem, Routine},
    utils::time::{format_duration, truncate_to_seconds},
};

use super::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub title: String,
    pub time_spent: Duration,
    pub checklist: Vec<ChecklistItem>,
}

/// Summary of a routine run: time per habit and the state of their checklists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    /// Kept to the nanosecond so a short pause still counts. Rendered in whole seconds.
    pub total_paused: Duration,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.total_paused.is_zero()
    }
}

/// Sums the time of all sessions per routine title.
///
/// Entries follow the order of `routines`, not the order habits were visited in. Checklists
/// are taken from `routines` as they are now. A title listed more than once is reported at its
/// first position only.
pub fn summarize(routines: &[Routine], sessions: &[Session], total_paused: Duration) -> Report {
    let mut spent = HashMap::<&str, Duration>::new();
    for session in sessions {
        *spent
            .entry(session.routine_title.as_str())
            .or_insert_with(Duration::zero) += session.elapsed;
    }

    let entries = routines
        .iter()
        .filter_map(|routine| {
            // removing makes a repeated title show up once
            let time_spent = spent.remove(routine.title.as_str())?;
            Some(ReportEntry {
                title: routine.title.clone(),
                time_spent: truncate_to_seconds(time_spent),
                checklist: routine.checklist.clone(),
            })
        })
        .collect();

    Report {
        entries,
        total_paused,
    }
}

/// Renders as markdown.
impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "### {}", title_case(&entry.title))?;
            writeln!(f, "Time Spent: {}", format_duration(entry.time_spent))?;
            writeln!(f)?;
            writeln!(f, "Checklist:")?;
            for item in &entry.checklist {
                writeln!(f, "- {} {}", item.mark(), item.text)?;
            }
            writeln!(f)?;
        }
        if !self.total_paused.is_zero() {
            writeln!(
                f,
                "Total Paused: {}",
                format_duration(truncate_to_seconds(self.total_paused))
            )?;
        }
        Ok(())
    }
}

/// Upper cases the first letter of every word.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        word_start = c.is_whitespace();
    }
    result
}
