//! Parsers for the free-form text users type into routine and event files.

pub mod date;
pub mod duration;

pub use date::parse_date;
pub use duration::parse_duration;
