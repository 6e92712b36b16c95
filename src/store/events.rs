use std::path::Path;

use chrono::NaiveDateTime;

use crate::{
    error::{CoreError, CoreResult},
    events::{Event, Repeat},
    parse::{date::EVENT_TIME_FORMAT, parse_date},
};

use super::markdown::{self, MarkdownRecord};

const EVENT_NAME_LABEL: &str = "Event Name:";

/// An event as it is being read, before its time is known to be present.
#[derive(Debug, Default)]
struct EventEntry {
    name: String,
    date_time: Option<NaiveDateTime>,
    repeat: Repeat,
    code_phrase: Option<String>,
}

impl MarkdownRecord for EventEntry {
    /// Reference time used for dates written without a year.
    type Context = NaiveDateTime;

    fn from_header(header: &str) -> Option<Self> {
        header
            .strip_prefix(EVENT_NAME_LABEL)
            .map(|name| EventEntry {
                name: name.trim().to_string(),
                ..Default::default()
            })
    }

    fn apply_attribute(&mut self, key: &str, value: &str, now: &NaiveDateTime) -> CoreResult<()> {
        match key.to_lowercase().as_str() {
            "time" => self.date_time = Some(parse_date(value, *now)?),
            "repeat" => self.repeat = Repeat::parse(value),
            "code phrase" => {
                self.code_phrase = Some(value.to_string()).filter(|phrase| !phrase.is_empty())
            }
            _ => {}
        }
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.name
    }

    fn render(&self, index: u32) -> String {
        let mut block = format!("{index}. {EVENT_NAME_LABEL} {}\n", self.name);
        if let Some(time) = self.date_time {
            block.push_str(&format!("- Time: {}\n", time.format(EVENT_TIME_FORMAT)));
        }
        if !self.repeat.is_never() {
            block.push_str(&format!("- Repeat: {}\n", self.repeat));
        }
        block.push_str(&format!(
            "- Code Phrase: {}\n",
            self.code_phrase.as_deref().unwrap_or_default()
        ));
        block
    }
}

impl TryFrom<EventEntry> for Event {
    type Error = CoreError;

    fn try_from(entry: EventEntry) -> Result<Self, Self::Error> {
        let date_time = entry
            .date_time
            .ok_or_else(|| CoreError::UnparseableDate(format!("no time for {}", entry.name)))?;
        Ok(Event {
            name: entry.name,
            date_time,
            repeat: entry.repeat,
            code_phrase: entry.code_phrase,
        })
    }
}

impl From<&Event> for EventEntry {
    fn from(event: &Event) -> Self {
        EventEntry {
            name: event.name.clone(),
            date_time: Some(event.date_time),
            repeat: event.repeat.clone(),
            code_phrase: event.code_phrase.clone(),
        }
    }
}

/// Loads the event store. Every event must carry a parseable time: the store is only written
/// by this application, so a broken entry fails the whole load.
pub fn load_events(path: &Path, now: NaiveDateTime) -> CoreResult<Vec<Event>> {
    markdown::load_records::<EventEntry>(path, &now)?
        .into_iter()
        .map(Event::try_from)
        .collect()
}

/// Appends `event` to the store and returns the index it was written under.
pub fn save_event_to_file(path: &Path, event: &Event) -> CoreResult<u32> {
    markdown::append_record(path, &EventEntry::from(event))
}
