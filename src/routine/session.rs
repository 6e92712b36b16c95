use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    store::routines::Routine,
    utils::percentage::Percentage,
};

use super::summary::{summarize, Report};

/// Used when the `Time` of a habit can't be parsed.
pub const DEFAULT_HABIT_DURATION: Duration = Duration::seconds(60);

/// Time spent on one visit of a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub routine_title: String,
    pub elapsed: Duration,
}

/// Where a routine run currently is. Clock related states carry the moment they began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No routine file selected.
    Idle,
    /// A routine file is loaded but nothing started yet.
    Viewing,
    /// Between habits, waiting for the next one to be started.
    ReadyToStart,
    Running { started: DateTime<Utc> },
    /// Full screen pause. Only resuming or stopping is possible.
    Pausing { since: DateTime<Utc> },
    /// Clock is held but the checklist can still be worked through.
    Paused { since: DateTime<Utc> },
    /// The run is over. Left only by returning to the menu.
    Stopped,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Viewing => "viewing",
            SessionState::ReadyToStart => "ready to start",
            SessionState::Running { .. } => "running",
            SessionState::Pausing { .. } => "pausing",
            SessionState::Paused { .. } => "paused",
            SessionState::Stopped => "stopped",
        }
    }

    /// States in which a segment of the routine is in progress.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Running { .. } | SessionState::Pausing { .. } | SessionState::Paused { .. }
        )
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Enter the full screen pause.
    Pause,
    /// Hold the clock while keeping the checklist usable.
    Hold,
    Resume,
    Advance,
    Rewind,
    SelectNext,
    SelectPrevious,
    /// Select the checklist item at the index and flip it.
    Toggle(usize),
    Stop,
    /// Periodic clock update. Expires the running habit when its time is up.
    Tick,
    ReturnToMenu,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Hold => "hold",
            Command::Resume => "resume",
            Command::Advance => "advance",
            Command::Rewind => "rewind",
            Command::SelectNext => "select next",
            Command::SelectPrevious => "select previous",
            Command::Toggle(_) => "toggle",
            Command::Stop => "stop",
            Command::Tick => "tick",
            Command::ReturnToMenu => "return to menu",
        }
    }
}

/// Side effects of a transition the caller has to act upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SessionRecorded(Session),
    /// The run reached [SessionState::Stopped]. The summary should be shown and persisted.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn is_finished(&self) -> bool {
        self.effects.contains(&Effect::Finished)
    }
}

/// State of one run through a routine file.
///
/// All timing is derived from the `now` values passed in, so late or missing ticks never
/// distort the recorded durations.
#[derive(Debug, Clone)]
pub struct RoutineSession {
    routines: Vec<Routine>,
    current: usize,
    state: SessionState,
    elapsed: Duration,
    total_paused: Duration,
    selected_todo: usize,
    sessions: Vec<Session>,
}

impl Default for RoutineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineSession {
    pub fn new() -> Self {
        Self {
            routines: vec![],
            current: 0,
            state: SessionState::Idle,
            elapsed: Duration::zero(),
            total_paused: Duration::zero(),
            selected_todo: 0,
            sessions: vec![],
        }
    }

    /// Selects a routine file. Any previous run is discarded.
    pub fn load(&mut self, routines: Vec<Routine>) -> CoreResult<()> {
        if !matches!(self.state, SessionState::Idle | SessionState::Viewing) {
            return Err(self.invalid("load"));
        }
        *self = Self {
            routines,
            state: SessionState::Viewing,
            ..Self::new()
        };
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_routine(&self) -> Option<&Routine> {
        self.routines.get(self.current)
    }

    pub fn selected_todo(&self) -> usize {
        self.selected_todo
    }

    pub fn total_paused(&self) -> Duration {
        self.total_paused
    }

    /// Planned duration of the current habit.
    pub fn current_duration(&self) -> Duration {
        let Some(routine) = self.current_routine() else {
            return DEFAULT_HABIT_DURATION;
        };
        routine.duration().unwrap_or_else(|e| {
            debug!("Habit {:?} has no usable time: {e}", routine.title);
            DEFAULT_HABIT_DURATION
        })
    }

    /// Time accrued on the current habit, including the part that is still running.
    pub fn current_elapsed(&self, now: DateTime<Utc>) -> Duration {
        match self.state {
            SessionState::Running { started } => self.elapsed + since(started, now),
            _ => self.elapsed,
        }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.current_duration() - self.current_elapsed(now)).max(Duration::zero())
    }

    /// How much of the current habit is done, capped at 100%.
    pub fn progress(&self, now: DateTime<Utc>) -> Percentage {
        Percentage::of(
            self.current_elapsed(now).num_milliseconds() as f64,
            self.current_duration().num_milliseconds() as f64,
        )
        .capped()
    }

    /// Report for everything recorded so far.
    pub fn summary_report(&self) -> Report {
        summarize(&self.routines, &self.sessions, self.total_paused)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Start, now)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Pause, now)
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Resume, now)
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Advance, now)
    }

    pub fn rewind(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Rewind, now)
    }

    pub fn toggle_checklist_item(&mut self, index: usize, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Toggle(index), now)
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> CoreResult<Outcome> {
        self.apply(Command::Stop, now)
    }

    /// Runs a single transition. Commands that make no sense in the current state fail with
    /// [CoreError::InvalidTransition] and leave the session untouched.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> CoreResult<Outcome> {
        use SessionState as S;

        let mut effects = vec![];
        match (self.state, command) {
            (S::Viewing | S::ReadyToStart, Command::Start) if self.current_routine().is_some() => {
                self.state = S::Running { started: now };
            }
            (S::Running { .. }, Command::Pause) => {
                self.fold(now);
                self.state = S::Pausing { since: now };
            }
            (S::ReadyToStart, Command::Pause) => {
                self.state = S::Pausing { since: now };
            }
            (S::Running { .. }, Command::Hold) => {
                self.fold(now);
                self.state = S::Paused { since: now };
            }
            (S::Pausing { .. } | S::Paused { .. }, Command::Resume) => {
                self.fold(now);
                self.state = S::Running { started: now };
            }
            (S::Running { .. } | S::Paused { .. }, Command::Advance) => {
                self.fold(now);
                self.finish_segment(true, &mut effects);
            }
            (S::Running { .. } | S::Paused { .. }, Command::Rewind) if self.current > 0 => {
                self.fold(now);
                self.finish_segment(false, &mut effects);
            }
            (S::Running { started }, Command::Tick) => {
                if self.elapsed + since(started, now) >= self.current_duration() {
                    debug!("Habit {} expired", self.current);
                    self.fold(now);
                    self.finish_segment(true, &mut effects);
                }
            }
            (_, Command::Tick) => {}
            (S::Running { .. } | S::Paused { .. }, Command::SelectNext) => {
                let len = self.current_routine().map_or(0, |r| r.checklist.len());
                if self.selected_todo + 1 < len {
                    self.selected_todo += 1;
                }
            }
            (S::Running { .. } | S::Paused { .. }, Command::SelectPrevious) => {
                self.selected_todo = self.selected_todo.saturating_sub(1);
            }
            (S::Running { .. } | S::Paused { .. }, Command::Toggle(index)) => {
                let out_of_range = self.invalid(command.name());
                let item = self
                    .routines
                    .get_mut(self.current)
                    .and_then(|routine| routine.checklist.get_mut(index))
                    .ok_or(out_of_range)?;
                item.toggle();
                self.selected_todo = index;
            }
            (S::Running { .. } | S::Pausing { .. } | S::Paused { .. }, Command::Stop) => {
                self.fold(now);
                self.record_session(&mut effects);
                self.stop_run(&mut effects);
            }
            (S::ReadyToStart, Command::Stop) => {
                self.stop_run(&mut effects);
            }
            (S::Viewing | S::Stopped, Command::ReturnToMenu) => {
                *self = Self::new();
            }
            _ => return Err(self.invalid(command.name())),
        }

        Ok(Outcome {
            state: self.state,
            effects,
        })
    }

    /// Moves time of the in-flight clock state into the counters and restarts its origin.
    fn fold(&mut self, now: DateTime<Utc>) {
        match &mut self.state {
            SessionState::Running { started } => {
                self.elapsed += since(*started, now);
                *started = now;
            }
            SessionState::Pausing { since: start } | SessionState::Paused { since: start } => {
                self.total_paused += since(*start, now);
                *start = now;
            }
            _ => {}
        }
    }

    fn record_session(&mut self, effects: &mut Vec<Effect>) {
        let Some(routine) = self.current_routine() else {
            return;
        };
        let session = Session {
            routine_title: routine.title.clone(),
            elapsed: self.elapsed,
        };
        self.sessions.push(session.clone());
        effects.push(Effect::SessionRecorded(session));
    }

    fn finish_segment(&mut self, forward: bool, effects: &mut Vec<Effect>) {
        self.record_session(effects);
        self.elapsed = Duration::zero();
        self.selected_todo = 0;
        if forward {
            self.current += 1;
        } else {
            self.current = self.current.saturating_sub(1);
        }

        if self.current >= self.routines.len() {
            self.stop_run(effects);
        } else {
            self.state = SessionState::ReadyToStart;
        }
    }

    fn stop_run(&mut self, effects: &mut Vec<Effect>) {
        self.state = SessionState::Stopped;
        effects.push(Effect::Finished);
    }

    fn invalid(&self, command: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            state: self.state.name(),
            command,
        }
    }
}

/// Non-negative time between two moments. Clock adjustments backwards count as nothing.
fn since(start: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - start).max(Duration::zero())
}
