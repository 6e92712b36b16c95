use std::{
    io::{BufRead, Write},
    path::Path,
    thread,
    time::Duration,
};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use futures::{stream::BoxStream, StreamExt};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tokio_stream::wrappers::{IntervalStream, ReceiverStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::CoreError,
    routine::{
        log::{DailyLogFile, LogSink},
        session::{Command, Outcome, RoutineSession, SessionState},
    },
    store::routines::{load_routines, Routine},
    utils::{
        clock::{Clock, LocalClock},
        dir::DataLayout,
        time::format_clock,
    },
};

use super::{shutdown::detect_shutdown, style};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const LINE_BUFFER: usize = 16;

pub const HELP: &str = "commands: s start | p pause | h hold | r resume | n next | b back | \
                        j/k move | t [n] toggle | stop | q quit | empty line shows status";

/// Everything that can wake the runner up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Tick,
    Line(String),
    /// Input ended or the user interrupted the program.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What a line typed by the user asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Apply(Command),
    /// Toggle the item under the cursor.
    ToggleSelected,
    Status,
    Help,
    Quit,
}

/// Interprets a typed line. `y` and `n` answer the start prompt shown between habits.
pub fn parse_request(line: &str, state: SessionState) -> Option<Request> {
    let line = line.trim().to_lowercase();
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Some(Request::Status);
    };

    let request = match (word, state) {
        ("y" | "yes", SessionState::ReadyToStart) => Request::Apply(Command::Start),
        ("n" | "no", SessionState::ReadyToStart) => Request::Apply(Command::Pause),
        ("s" | "start", _) => Request::Apply(Command::Start),
        ("p" | "pause", _) => Request::Apply(Command::Pause),
        ("h" | "hold", _) => Request::Apply(Command::Hold),
        ("r" | "resume", _) => Request::Apply(Command::Resume),
        ("n" | "next", _) => Request::Apply(Command::Advance),
        ("b" | "back", _) => Request::Apply(Command::Rewind),
        ("j" | "down", _) => Request::Apply(Command::SelectNext),
        ("k" | "up", _) => Request::Apply(Command::SelectPrevious),
        ("t" | "toggle", _) => match words.next() {
            Some(number) => {
                let index = number.parse::<usize>().ok()?.checked_sub(1)?;
                Request::Apply(Command::Toggle(index))
            }
            None => Request::ToggleSelected,
        },
        ("stop", _) => Request::Apply(Command::Stop),
        ("q" | "quit" | "exit", _) => Request::Quit,
        ("?" | "help", _) => Request::Help,
        _ => return None,
    };
    Some(request)
}

/// Runs one routine file interactively until it is finished or the user quits.
pub async fn run_routine(path: &Path, layout: &DataLayout) -> Result<()> {
    let routines = load_routines(path)?;
    info!("Running {path:?} with {} habits", routines.len());

    let mut runner = RoutineRunner::new(
        routines,
        Box::new(LocalClock),
        Box::new(DailyLogFile::new(layout.logging_dir())),
        std::io::stdout(),
    )?;
    let lines = blocking_lines(std::io::BufReader::new(std::io::stdin()))?;
    let shutdown = CancellationToken::new();

    let (_, result) = tokio::join!(
        detect_shutdown(shutdown.clone()),
        runner.drive(terminal_inputs(lines, TICK_PERIOD), shutdown.clone()),
    );
    result
}

/// Reads `reader` line by line on its own thread. The thread is never joined, so a read that
/// is still pending when the run ends does not keep the process alive.
/// A [Input::Quit] follows the last line.
pub fn blocking_lines<R>(reader: R) -> Result<BoxStream<'static, Input>>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel::<Input>(LINE_BUFFER);
    thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            for line in reader.lines() {
                let input = match line {
                    Ok(line) => Input::Line(line),
                    Err(e) => {
                        warn!("Failed to read input {e:?}");
                        break;
                    }
                };
                if sender.blocking_send(input).is_err() {
                    debug!("Input receiver is gone");
                    return;
                }
            }
            let _ = sender.blocking_send(Input::Quit);
        })?;
    Ok(ReceiverStream::new(receiver).boxed())
}

/// Ticks every `period` merged with `lines`.
pub fn terminal_inputs(lines: BoxStream<'static, Input>, period: Duration) -> BoxStream<'static, Input> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ticks = IntervalStream::new(interval).map(|_| Input::Tick);

    futures::stream::select(ticks, lines).boxed()
}

/// Drives a [RoutineSession] from user input and clock ticks, printing to `out`.
pub struct RoutineRunner<W: Write> {
    session: RoutineSession,
    clock: Box<dyn Clock>,
    log: Box<dyn LogSink>,
    out: W,
}

impl<W: Write> RoutineRunner<W> {
    pub fn new(
        routines: Vec<Routine>,
        clock: Box<dyn Clock>,
        log: Box<dyn LogSink>,
        mut out: W,
    ) -> Result<Self> {
        let mut session = RoutineSession::new();
        session.load(routines)?;

        writeln!(out, "{}", style::heading("Routine"))?;
        for (i, routine) in session.routines().iter().enumerate() {
            writeln!(out, "{}. {} ({})", i + 1, routine.title, routine.time)?;
        }
        writeln!(out, "{}", style::muted(HELP))?;

        Ok(Self {
            session,
            clock,
            log,
            out,
        })
    }

    pub fn session(&self) -> &RoutineSession {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Handles inputs until the run is over. `shutdown` counts as [Input::Quit] and is
    /// cancelled on return.
    pub async fn drive(
        &mut self,
        mut inputs: BoxStream<'_, Input>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let result = loop {
            let input = tokio::select! {
                _ = shutdown.cancelled() => Input::Quit,
                input = inputs.next() => input.unwrap_or(Input::Quit),
            };
            match self.handle(input) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        shutdown.cancel();
        result
    }

    pub fn handle(&mut self, input: Input) -> Result<Flow> {
        let now = self.clock.now();
        match input {
            Input::Tick => self.apply(Command::Tick, now),
            Input::Quit => self.quit(now),
            Input::Line(line) => match parse_request(&line, self.session.state()) {
                Some(Request::Apply(command)) => self.apply(command, now),
                Some(Request::ToggleSelected) => {
                    self.apply(Command::Toggle(self.session.selected_todo()), now)
                }
                Some(Request::Status) => {
                    self.print_status(now)?;
                    Ok(Flow::Continue)
                }
                Some(Request::Help) | None => {
                    writeln!(self.out, "{}", style::muted(HELP))?;
                    Ok(Flow::Continue)
                }
                Some(Request::Quit) => self.quit(now),
            },
        }
    }

    fn quit(&mut self, now: DateTime<Local>) -> Result<Flow> {
        let state = self.session.state();
        if state.is_active() || state == SessionState::ReadyToStart {
            self.apply(Command::Stop, now)
        } else {
            Ok(Flow::Exit)
        }
    }

    fn apply(&mut self, command: Command, now: DateTime<Local>) -> Result<Flow> {
        let before = self.session.state();
        let outcome = match self.session.apply(command, now.with_timezone(&Utc)) {
            Ok(outcome) => outcome,
            Err(e @ CoreError::InvalidTransition { .. }) => {
                debug!("Ignoring {e}");
                if command != Command::Tick {
                    writeln!(self.out, "{}", style::problem(&e.to_string()))?;
                }
                return Ok(Flow::Continue);
            }
            Err(e) => return Err(e.into()),
        };

        if outcome.is_finished() {
            self.finish(now)?;
            return Ok(Flow::Exit);
        }
        // ticks only report when they move the session into another state
        let moved = std::mem::discriminant(&before) != std::mem::discriminant(&outcome.state);
        if command != Command::Tick || moved {
            self.print_transition(&outcome, now)?;
        }
        Ok(Flow::Continue)
    }

    fn finish(&mut self, now: DateTime<Local>) -> Result<()> {
        let report = self.session.summary_report();
        writeln!(self.out, "{}", style::heading("Summary"))?;
        write!(self.out, "{report}")?;
        if let Err(e) = self.log.append(now, &report) {
            warn!("Failed to save the session log {e:?}");
            writeln!(self.out, "{}", style::problem(&format!("log not saved: {e}")))?;
        }
        Ok(())
    }

    fn print_transition(&mut self, outcome: &Outcome, now: DateTime<Local>) -> Result<()> {
        match outcome.state {
            SessionState::ReadyToStart => {
                let title = self
                    .session
                    .current_routine()
                    .map(|r| r.title.clone())
                    .unwrap_or_default();
                writeln!(self.out, "Next up: {title}. Start? (y/n)")?;
                Ok(())
            }
            SessionState::Pausing { .. } => {
                writeln!(self.out, "Paused. Type r to resume.")?;
                Ok(())
            }
            _ => self.print_status(now),
        }
    }

    fn print_status(&mut self, now: DateTime<Local>) -> Result<()> {
        let now = now.with_timezone(&Utc);
        let Some(routine) = self.session.current_routine() else {
            writeln!(self.out, "[{}]", self.session.state())?;
            return Ok(());
        };
        writeln!(
            self.out,
            "{} [{}] {} / {} {}",
            style::heading(&routine.title),
            self.session.state(),
            format_clock(self.session.current_elapsed(now)),
            format_clock(self.session.current_duration()),
            self.session.progress(now),
        )?;
        for (i, item) in routine.checklist.iter().enumerate() {
            let cursor = if i == self.session.selected_todo() { ">" } else { " " };
            writeln!(self.out, " {cursor} {}. {} {}", i + 1, item.mark(), item.text)?;
        }
        Ok(())
    }
}
