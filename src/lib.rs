//! Terminal companion for the day: a dashboard with progress of the year down to the day,
//! countdowns to recurring events, quotes, and timed routines whose runs are summarized into a
//! daily markdown log.
//!
//! Everything is stored as plain markdown files inside a single data directory, see
//! [utils::dir::DataLayout].

pub mod cli;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod parse;
pub mod routine;
pub mod store;
pub mod utils;
