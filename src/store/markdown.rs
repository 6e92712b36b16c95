use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{CoreError, CoreResult};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("valid header regex"));
static CHECKLIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*\[([ xX])\]\s*(.*)$").expect("valid checklist regex"));
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+([^:\[]+?):\s*(.*)$").expect("valid attribute regex"));

/// A record stored in one of the numbered markdown files.
///
/// Every record starts at a `<N>. ...` header line. The lines below it until the next header
/// belong to the record.
pub trait MarkdownRecord: Sized {
    /// Extra information needed to interpret attribute values.
    type Context;

    /// Builds a record from the header text that follows `<N>.`. Returns `None` when the line
    /// is not a header of this kind of record.
    fn from_header(header: &str) -> Option<Self>;

    /// Applies a `- Key: value` line.
    fn apply_attribute(&mut self, key: &str, value: &str, context: &Self::Context)
        -> CoreResult<()>;

    /// Applies a `- [ ] text` or `- [x] text` line.
    fn apply_checklist(&mut self, _complete: bool, _text: &str) {}

    /// Records with an empty identifier are dropped while loading.
    fn identifier(&self) -> &str;

    /// Renders the record as a block numbered `index`.
    fn render(&self, index: u32) -> String;
}

/// A line of a markdown store after classification.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Header { index: u32, rest: &'a str },
    Checklist { complete: bool, text: &'a str },
    Attribute { key: &'a str, value: &'a str },
    Other,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(captures) = HEADER_RE.captures(line) {
        let (Some(index), Some(rest)) = (captures.get(1), captures.get(2)) else {
            return Line::Other;
        };
        // An index too large for u32 is not a header we ever wrote
        return match index.as_str().parse() {
            Ok(index) => Line::Header {
                index,
                rest: rest.as_str(),
            },
            Err(_) => Line::Other,
        };
    }
    if let Some(captures) = CHECKLIST_RE.captures(line) {
        if let (Some(mark), Some(text)) = (captures.get(1), captures.get(2)) {
            return Line::Checklist {
                complete: mark.as_str().eq_ignore_ascii_case("x"),
                text: text.as_str(),
            };
        }
    }
    if let Some(captures) = ATTRIBUTE_RE.captures(line) {
        if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
            return Line::Attribute {
                key: key.as_str().trim(),
                value: value.as_str().trim(),
            };
        }
    }
    Line::Other
}

/// Meaningful lines of a store, with blank and `#` comment lines removed.
fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parses the records of a store that has already been read.
pub fn parse_records<R: MarkdownRecord>(content: &str, context: &R::Context) -> CoreResult<Vec<R>> {
    let mut records = Vec::new();
    let mut current: Option<R> = None;

    for line in content_lines(content) {
        match classify(line) {
            Line::Header { rest, .. } => {
                let Some(next) = R::from_header(rest) else {
                    continue;
                };
                if let Some(finished) = current.replace(next) {
                    push_identified(&mut records, finished);
                }
            }
            Line::Checklist { complete, text } => {
                if let Some(record) = current.as_mut() {
                    record.apply_checklist(complete, text);
                }
            }
            Line::Attribute { key, value } => {
                if let Some(record) = current.as_mut() {
                    record.apply_attribute(key, value, context)?;
                }
            }
            Line::Other => {}
        }
    }

    if let Some(finished) = current {
        push_identified(&mut records, finished);
    }

    Ok(records)
}

fn push_identified<R: MarkdownRecord>(records: &mut Vec<R>, record: R) {
    if record.identifier().is_empty() {
        debug!("Dropping record without identifier");
    } else {
        records.push(record);
    }
}

/// Loads every record of a store. A missing store is treated as an empty one and its directory
/// is created so that later appends succeed.
#[instrument(skip(context))]
pub fn load_records<R: MarkdownRecord>(path: &Path, context: &R::Context) -> CoreResult<Vec<R>> {
    match read_store(path)? {
        Some(content) => parse_records(&content, context),
        None => Ok(vec![]),
    }
}

/// Appends `record` numbered one above the highest index already present.
#[instrument(skip(record))]
pub fn append_record<R: MarkdownRecord>(path: &Path, record: &R) -> CoreResult<u32> {
    let existing = read_store(path)?.unwrap_or_default();
    let index = highest_index::<R>(&existing) + 1;

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| CoreError::store(path, e))?;

    let mut block = String::from("\n");
    block.push_str(&record.render(index));
    file.write_all(block.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| CoreError::store(path, e))?;

    debug!("Appended record {index} to {path:?}");
    Ok(index)
}

/// Highest header index among headers of this record kind. Gaps and ordering are ignored.
fn highest_index<R: MarkdownRecord>(content: &str) -> u32 {
    content_lines(content)
        .filter_map(|line| match classify(line) {
            Line::Header { index, rest } if R::from_header(rest).is_some() => Some(index),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

/// Reads the store, returning `None` when it does not exist yet.
fn read_store(path: &Path) -> CoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ensure_parent_dir(path)?;
            Ok(None)
        }
        Err(e) => Err(CoreError::store(path, e)),
    }
}

fn ensure_parent_dir(path: &Path) -> CoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| CoreError::store(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::tempdir;

    use crate::error::{CoreError, CoreResult};

    use super::{append_record, classify, load_records, parse_records, Line, MarkdownRecord};

    /// Minimal record kind used to exercise the generic store.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Note {
        name: String,
        attributes: Vec<(String, String)>,
        checks: Vec<(bool, String)>,
    }

    impl MarkdownRecord for Note {
        type Context = ();

        fn from_header(header: &str) -> Option<Self> {
            header.strip_prefix("Note:").map(|name| Note {
                name: name.trim().to_string(),
                ..Default::default()
            })
        }

        fn apply_attribute(&mut self, key: &str, value: &str, _: &()) -> CoreResult<()> {
            if key == "Broken" {
                return Err(CoreError::MalformedDuration(value.to_string()));
            }
            self.attributes.push((key.to_string(), value.to_string()));
            Ok(())
        }

        fn apply_checklist(&mut self, complete: bool, text: &str) {
            self.checks.push((complete, text.to_string()));
        }

        fn identifier(&self) -> &str {
            &self.name
        }

        fn render(&self, index: u32) -> String {
            let mut block = format!("{index}. Note: {}\n", self.name);
            for (key, value) in &self.attributes {
                block.push_str(&format!("- {key}: {value}\n"));
            }
            block
        }
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(
            classify("12. Note: hello"),
            Line::Header {
                index: 12,
                rest: "Note: hello"
            }
        );
        assert_eq!(
            classify("- [x] done"),
            Line::Checklist {
                complete: true,
                text: "done"
            }
        );
        assert_eq!(
            classify("- [ ] open"),
            Line::Checklist {
                complete: false,
                text: "open"
            }
        );
        assert_eq!(
            classify("- Code Phrase: "),
            Line::Attribute {
                key: "Code Phrase",
                value: ""
            }
        );
        assert_eq!(classify("just text"), Line::Other);
    }

    #[test]
    fn test_parse_records_in_file_order() -> Result<()> {
        let content = "# heading\n\
                       \n\
                       3. Note: first\n\
                       - Color: red\n\
                       - [ ] one\n\
                       - [x] two\n\
                       1. Note: second\n\
                       - Color: blue\n";
        let notes: Vec<Note> = parse_records(content, &())?;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].name, "first");
        assert_eq!(
            notes[0].checks,
            vec![(false, "one".to_string()), (true, "two".to_string())]
        );
        assert_eq!(notes[1].attributes, vec![("Color".into(), "blue".into())]);
        Ok(())
    }

    #[test]
    fn test_records_without_identifier_are_dropped() -> Result<()> {
        let content = "1. Note:\n- Color: red\n2. Note: kept\n";
        let notes: Vec<Note> = parse_records(content, &())?;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].name, "kept");
        Ok(())
    }

    #[test]
    fn test_attribute_errors_propagate() {
        let content = "1. Note: bad\n- Broken: value\n";
        assert!(parse_records::<Note>(content, &()).is_err());
    }

    #[test]
    fn test_missing_store_creates_directory() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("notes.md");
        let notes: Vec<Note> = load_records(&path, &())?;
        assert!(notes.is_empty());
        assert!(dir.path().join("nested").is_dir());
        Ok(())
    }

    #[test]
    fn test_unreadable_store_is_unavailable() -> Result<()> {
        let dir = tempdir()?;
        // A directory in place of the file can't be read as text
        let path = dir.path().join("notes.md");
        fs::create_dir(&path)?;
        assert!(matches!(
            load_records::<Note>(&path, &()),
            Err(CoreError::StoreUnavailable { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_append_then_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes").join("notes.md");
        let note = Note {
            name: "written".into(),
            attributes: vec![("Color".into(), "green".into())],
            checks: vec![],
        };

        let index = append_record(&path, &note)?;
        assert_eq!(index, 1);

        let loaded: Vec<Note> = load_records(&path, &())?;
        assert_eq!(loaded, vec![note]);
        Ok(())
    }

    #[test]
    fn test_append_uses_highest_index() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.md");
        fs::write(&path, "7. Note: a\n2. Note: b\n10. Something else\n")?;

        let index = append_record(
            &path,
            &Note {
                name: "c".into(),
                ..Default::default()
            },
        )?;
        assert_eq!(index, 8);

        let content = fs::read_to_string(&path)?;
        assert!(content.ends_with("\n8. Note: c\n"));
        Ok(())
    }
}
