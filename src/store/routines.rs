use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Duration;
use tracing::{info, instrument};

use crate::{
    error::{CoreError, CoreResult},
    parse::parse_duration,
};

use super::markdown::{self, MarkdownRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub complete: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            complete: false,
        }
    }

    pub fn toggle(&mut self) {
        self.complete = !self.complete;
    }

    pub fn mark(&self) -> &'static str {
        if self.complete {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// A single habit of a routine file: a title, how long it should take and its todos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub title: String,
    pub time: String,
    pub checklist: Vec<ChecklistItem>,
}

impl Routine {
    pub fn new(title: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
            checklist: vec![],
        }
    }

    pub fn with_todo(mut self, text: impl Into<String>) -> Self {
        self.checklist.push(ChecklistItem::new(text));
        self
    }

    /// Parsed value of the `Time` attribute.
    pub fn duration(&self) -> CoreResult<Duration> {
        parse_duration(&self.time)
    }
}

impl MarkdownRecord for Routine {
    type Context = ();

    fn from_header(header: &str) -> Option<Self> {
        Some(Routine::new(header.trim(), ""))
    }

    fn apply_attribute(&mut self, key: &str, value: &str, _: &()) -> CoreResult<()> {
        if key.eq_ignore_ascii_case("time") {
            self.time = value.to_string();
        }
        Ok(())
    }

    fn apply_checklist(&mut self, complete: bool, text: &str) {
        self.checklist.push(ChecklistItem {
            text: text.to_string(),
            complete,
        });
    }

    fn identifier(&self) -> &str {
        &self.title
    }

    fn render(&self, index: u32) -> String {
        let mut block = format!("{index}. {}\n- Time: {}\n", self.title, self.time);
        for item in &self.checklist {
            block.push_str(&format!("- {} {}\n", item.mark(), item.text));
        }
        block
    }
}

pub fn load_routines(path: &Path) -> CoreResult<Vec<Routine>> {
    markdown::load_records(path, &())
}

/// A routine file found in the routines directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineFile {
    pub path: PathBuf,
    pub display_name: String,
}

/// Lists `*.md` files of the routines directory sorted by name. Creates the directory when it
/// doesn't exist yet.
pub fn list_routine_files(dir: &Path) -> CoreResult<Vec<RoutineFile>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| CoreError::store(dir, e))?;
            return Ok(vec![]);
        }
        Err(e) => return Err(CoreError::store(dir, e)),
    };

    let mut files = vec![];
    for entry in entries {
        let path = entry.map_err(|e| CoreError::store(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        files.push(RoutineFile {
            display_name: stem.replace('_', " "),
            path,
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// File name a routine titled `title` is stored under.
pub fn routine_file_name(title: &str) -> String {
    format!("{}.md", title.trim().replace(' ', "_"))
}

/// Writes a new routine file with a `# title` heading followed by the numbered habits.
/// An existing file with the same name is replaced.
#[instrument(skip(habits))]
pub fn create_routine_file(dir: &Path, title: &str, habits: &[Routine]) -> CoreResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| CoreError::store(dir, e))?;
    let path = dir.join(routine_file_name(title));

    let mut content = format!("# {title}\n\n");
    for (index, habit) in (1..).zip(habits) {
        content.push_str(&habit.render(index));
        content.push('\n');
    }

    fs::write(&path, content).map_err(|e| CoreError::store(&path, e))?;
    info!("Created routine file {path:?} with {} habits", habits.len());
    Ok(path)
}
