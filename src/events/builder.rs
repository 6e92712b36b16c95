use chrono::NaiveDateTime;
use tracing::debug;

use crate::parse::{date::EVENT_TIME_FORMAT, parse_date};

use super::{Event, Repeat};

/// Answer to the repeat and code phrase prompts that leaves the value empty.
pub const NONE_KEYWORD: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStage {
    Name,
    Time,
    Repeat,
    CodePhrase,
    Done,
}

impl EventStage {
    pub fn prompt(&self) -> &'static str {
        match self {
            EventStage::Name => "Event name:",
            EventStage::Time => "Event Time (e.g. 17 August 2025 15:00):",
            EventStage::Repeat => "Repeat (daily, weekly, monthly, yearly, or 'none'):",
            EventStage::CodePhrase => "Code Phrase (optional, or 'none'):",
            EventStage::Done => "Event saved.",
        }
    }
}

/// Collects a new event one line of input at a time.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    stage: EventStage,
    name: String,
    date_time: Option<NaiveDateTime>,
    repeat: Repeat,
    error: Option<String>,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            stage: EventStage::Name,
            name: String::new(),
            date_time: None,
            repeat: Repeat::Never,
            error: None,
        }
    }

    pub fn stage(&self) -> EventStage {
        self.stage
    }

    pub fn prompt(&self) -> &'static str {
        self.stage.prompt()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.stage == EventStage::Done
    }

    /// Feeds one line, `now` resolves dates written without a year. Returns the event after the
    /// code phrase prompt.
    ///
    /// Empty lines are ignored. A time or repeat value that can't be understood keeps the
    /// builder on the same prompt with [EventBuilder::error] set.
    pub fn submit(&mut self, input: &str, now: NaiveDateTime) -> Option<Event> {
        let value = input.trim();
        if value.is_empty() || self.is_done() {
            return None;
        }
        self.error = None;

        match self.stage {
            EventStage::Name => {
                self.name = value.to_string();
                self.stage = EventStage::Time;
            }
            EventStage::Time => match parse_date(value, now) {
                Ok(time) => {
                    self.date_time = Some(time);
                    self.stage = EventStage::Repeat;
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            EventStage::Repeat => match Repeat::parse(value) {
                Repeat::Unrecognized(text) => {
                    self.error = Some(format!("unknown repeat value: {text:?}"))
                }
                repeat => {
                    self.repeat = repeat;
                    self.stage = EventStage::CodePhrase;
                }
            },
            EventStage::CodePhrase => {
                let date_time = self.date_time?;
                let code_phrase = Some(value)
                    .filter(|phrase| !phrase.eq_ignore_ascii_case(NONE_KEYWORD))
                    .map(str::to_string);
                self.stage = EventStage::Done;
                debug!("Finished event {:?}", self.name);
                return Some(Event {
                    name: self.name.clone(),
                    date_time,
                    repeat: self.repeat.clone(),
                    code_phrase,
                });
            }
            EventStage::Done => {}
        }
        None
    }

    /// Markdown of the answers given so far.
    pub fn preview(&self) -> String {
        let mut preview = String::new();
        if self.name.is_empty() {
            return preview;
        }
        preview.push_str(&format!("# {}\n", self.name));
        if let Some(time) = self.date_time {
            preview.push_str(&format!("- Time: {}\n", time.format(EVENT_TIME_FORMAT)));
        }
        if matches!(self.stage, EventStage::CodePhrase | EventStage::Done) {
            preview.push_str(&format!("- Repeat: {}\n", self.repeat));
        }
        preview
    }
}
