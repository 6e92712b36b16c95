use ansi_term::{Colour, Style};

pub fn heading(text: &str) -> String {
    Colour::Cyan.bold().paint(text).to_string()
}

pub fn muted(text: &str) -> String {
    Style::new().dimmed().paint(text).to_string()
}

pub fn problem(text: &str) -> String {
    Colour::Red.paint(text).to_string()
}
