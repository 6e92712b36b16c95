use std::{path::Path, sync::LazyLock};

use regex::Regex;

use crate::error::CoreResult;

use super::markdown::{self, MarkdownRecord};

static QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]+)"\s*-\s*(.+)$"#).expect("valid quote regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl MarkdownRecord for Quote {
    type Context = ();

    fn from_header(header: &str) -> Option<Self> {
        let captures = QUOTE_RE.captures(header)?;
        Some(Quote {
            text: captures.get(1)?.as_str().to_string(),
            author: captures.get(2)?.as_str().trim().to_string(),
        })
    }

    fn apply_attribute(&mut self, _: &str, _: &str, _: &()) -> CoreResult<()> {
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.text
    }

    fn render(&self, index: u32) -> String {
        format!("{index}. \"{}\" - {}\n", self.text, self.author)
    }
}

pub fn load_quotes(path: &Path) -> CoreResult<Vec<Quote>> {
    markdown::load_records(path, &())
}
