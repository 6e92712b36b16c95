//! Running a routine: a list of habits timed one after another.
//!
//! [session::RoutineSession] holds the state of a run, [summary] turns the recorded sessions into
//! a report and [log] appends that report to the daily log. [builder] creates new routine files.

pub mod builder;
pub mod log;
pub mod session;
pub mod summary;

pub use session::{Command, Effect, Outcome, RoutineSession, Session, SessionState};
pub use summary::{summarize, Report};
