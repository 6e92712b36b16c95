use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::CoreResult,
    parse::parse_duration,
    store::routines::{create_routine_file, ChecklistItem, Routine},
};

/// Word that closes the habit list or the todo list of a habit.
pub const DONE_KEYWORD: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineStage {
    Title,
    Habit,
    Time,
    Todo,
    Done,
}

impl RoutineStage {
    pub fn prompt(&self) -> &'static str {
        match self {
            RoutineStage::Title => "Routine title:",
            RoutineStage::Habit => "Habit name (or 'done' to finish):",
            RoutineStage::Time => "Time for this habit (e.g. 1h):",
            RoutineStage::Todo => "Todo item (enter 'done' when no more todos):",
            RoutineStage::Done => "Routine saved.",
        }
    }
}

/// A finished routine ready to be written into the routines directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDraft {
    pub title: String,
    pub habits: Vec<Routine>,
}

impl RoutineDraft {
    pub fn save(&self, routines_dir: &Path) -> CoreResult<PathBuf> {
        create_routine_file(routines_dir, &self.title, &self.habits)
    }
}

/// Collects a routine one line of input at a time.
#[derive(Debug, Clone)]
pub struct RoutineBuilder {
    stage: RoutineStage,
    title: String,
    habits: Vec<Routine>,
    pending_habit: String,
    error: Option<String>,
}

impl Default for RoutineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineBuilder {
    pub fn new() -> Self {
        Self {
            stage: RoutineStage::Title,
            title: String::new(),
            habits: vec![],
            pending_habit: String::new(),
            error: None,
        }
    }

    pub fn stage(&self) -> RoutineStage {
        self.stage
    }

    pub fn prompt(&self) -> &'static str {
        self.stage.prompt()
    }

    /// Problem with the last input, shown next to the repeated prompt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.stage == RoutineStage::Done
    }

    /// Feeds one line. Returns the draft once the habit list is closed.
    ///
    /// Empty lines are ignored. A time that can't be parsed keeps the builder on the time
    /// prompt with [RoutineBuilder::error] set.
    pub fn submit(&mut self, input: &str) -> Option<RoutineDraft> {
        let value = input.trim();
        if value.is_empty() || self.is_done() {
            return None;
        }
        self.error = None;
        let is_done = value.eq_ignore_ascii_case(DONE_KEYWORD);

        match self.stage {
            RoutineStage::Title => {
                self.title = value.to_string();
                self.stage = RoutineStage::Habit;
            }
            RoutineStage::Habit if is_done => {
                self.stage = RoutineStage::Done;
                debug!("Finished routine {:?} with {} habits", self.title, self.habits.len());
                return Some(RoutineDraft {
                    title: self.title.clone(),
                    habits: self.habits.clone(),
                });
            }
            RoutineStage::Habit => {
                self.pending_habit = value.to_string();
                self.stage = RoutineStage::Time;
            }
            RoutineStage::Time => match parse_duration(value) {
                Ok(_) => {
                    let title = std::mem::take(&mut self.pending_habit);
                    self.habits.push(Routine::new(title, value));
                    self.stage = RoutineStage::Todo;
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            RoutineStage::Todo if is_done => self.stage = RoutineStage::Habit,
            RoutineStage::Todo => {
                if let Some(habit) = self.habits.last_mut() {
                    habit.checklist.push(ChecklistItem::new(value));
                }
            }
            RoutineStage::Done => {}
        }
        None
    }
}

/// Shows the file as it would be written so far.
impl Display for RoutineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.title.is_empty() {
            return Ok(());
        }
        writeln!(f, "# {}", self.title)?;
        for (i, habit) in self.habits.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "{}. {}", i + 1, habit.title)?;
            writeln!(f, "- Time: {}", habit.time)?;
            for item in &habit.checklist {
                writeln!(f, "- {} {}", item.mark(), item.text)?;
            }
        }
        if !self.pending_habit.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}. {}", self.habits.len() + 1, self.pending_habit)?;
        }
        Ok(())
    }
}
