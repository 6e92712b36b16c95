pub mod builders;
pub mod events;
pub mod run;
pub mod shutdown;
pub mod style;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use events::{process_events_command, EventsCommand};
use tokio::io::BufReader;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    dashboard::{format_time_left, greet, pick_quote, time_left_today},
    events::{event_views, Event},
    store::{
        events::load_events,
        quotes::{load_quotes, Quote},
        routines::{list_routine_files, RoutineFile},
    },
    utils::{
        dir::{create_application_default_path, create_dir, DataLayout},
        logging::{enable_logging, CLI_PREFIX},
        time::format_clock,
    },
};

/// How many events the dashboard shows.
const UPCOMING_EVENTS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "dayglance", version, long_about = None)]
#[command(about = "Terminal dashboard with routine timers, recurring events and quotes", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Data directory. By default uses $DAYGLANCE_DIR, $XDG_DATA_HOME/dayglance or $HOME/.local/share/dayglance"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Greeting, progress of the day, upcoming events and a quote. The default")]
    Dashboard,
    #[command(about = "List events with countdowns to their next occurrence")]
    Events {
        #[command(flatten)]
        command: EventsCommand,
    },
    #[command(about = "Print a quote")]
    Quote,
    #[command(about = "List routine files")]
    Routines,
    #[command(about = "Run a routine. Accepts its name or its number from `routines`")]
    Run { routine: String },
    #[command(about = "Create a routine file step by step")]
    NewRoutine,
    #[command(about = "Add an event step by step")]
    AddEvent,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let root = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };
    let layout = DataLayout::new(root);

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &layout.logs_dir(), logging_level, args.log)?;
    debug!("Using data directory {:?}", layout.root());

    match args.commands.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let now = Local::now();
            let events = load_events(&layout.events_file(), now.naive_local())?;
            let quotes = load_quotes(&layout.quotes_file())?;
            print!("{}", render_dashboard(&now, &events, &quotes));
            Ok(())
        }
        Commands::Events { command } => process_events_command(command, &layout),
        Commands::Quote => {
            let quotes = load_quotes(&layout.quotes_file())?;
            println!("{}", render_quote(&pick_quote(&quotes, seed(&Local::now()))));
            Ok(())
        }
        Commands::Routines => {
            let files = list_routine_files(&layout.routines_dir())?;
            print!("{}", render_routine_files(&files));
            Ok(())
        }
        Commands::Run { routine } => {
            let files = list_routine_files(&layout.routines_dir())?;
            let path = find_routine(&files, &routine)
                .ok_or_else(|| anyhow!("No routine {routine:?} in {:?}", layout.routines_dir()))?;
            run::run_routine(&path, &layout).await
        }
        Commands::NewRoutine => {
            let input = BufReader::new(tokio::io::stdin());
            let mut out = std::io::stdout();
            builders::build_routine(input, &mut out, &layout.routines_dir()).await?;
            Ok(())
        }
        Commands::AddEvent => {
            let input = BufReader::new(tokio::io::stdin());
            let mut out = std::io::stdout();
            let now = Local::now().naive_local();
            builders::build_event(input, &mut out, &layout.events_file(), now).await?;
            Ok(())
        }
    }
}

fn seed(now: &DateTime<Local>) -> u64 {
    now.timestamp().unsigned_abs()
}

fn render_quote(quote: &Quote) -> String {
    format!("\"{}\" - {}", quote.text, quote.author)
}

/// The landing screen. Events are sorted by how soon they come up.
pub fn render_dashboard(now: &DateTime<Local>, events: &[Event], quotes: &[Quote]) -> String {
    let mut text = greet(now);
    text.push_str(&format!(
        "\nTime left today: {}\n",
        format_clock(time_left_today(now))
    ));

    let reference = now.naive_local();
    let mut views = event_views(events, reference);
    views.sort_by_key(|view| view.next_occurrence);
    if !views.is_empty() {
        text.push_str(&format!("\n{}\n", style::heading("Upcoming")));
        for view in views.iter().take(UPCOMING_EVENTS) {
            text.push_str(&format!(
                "{} in {}\n",
                view.display_name,
                format_time_left(view.next_occurrence - reference)
            ));
        }
    }

    text.push_str(&format!(
        "\n{}\n",
        style::muted(&render_quote(&pick_quote(quotes, seed(now))))
    ));
    text
}

fn render_routine_files(files: &[RoutineFile]) -> String {
    if files.is_empty() {
        return format!("{}\n", style::muted("No routines yet. Create one with new-routine."));
    }
    files
        .iter()
        .enumerate()
        .map(|(i, file)| format!("{}. {}\n", i + 1, file.display_name))
        .collect()
}

/// Matches a display name, a file name or a 1 based position in `files`.
fn find_routine(files: &[RoutineFile], query: &str) -> Option<PathBuf> {
    let query = query.trim();
    if let Ok(number) = query.parse::<usize>() {
        return files.get(number.checked_sub(1)?).map(|file| file.path.clone());
    }
    files
        .iter()
        .find(|file| {
            file.display_name.eq_ignore_ascii_case(query)
                || file
                    .path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().eq_ignore_ascii_case(query))
        })
        .map(|file| file.path.clone())
}
