//! Interactive countdown.
//!
//! One tokio `current_thread` loop owns the controller and waits on the next
//! timer deadline, stdin, Ctrl-C and the deferred update check. Every branch
//! runs to completion before the next one is polled.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use pomotick_core::storage::{self, UpdateConfig};
use pomotick_core::update::STARTUP_CHECK_DELAY;
use pomotick_core::{Config, Event, TimerController, UpdateChecker};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use crate::audio;

const HELP: &str = "\
commands: <enter>/t start-pause   r reset   c next preset   s stop alarm
          <minutes> set duration  ? status  v version       q quit";

#[derive(Args)]
pub struct RunArgs {
    /// Start from this many minutes instead of the default preset
    #[arg(long)]
    minutes: Option<u32>,
    /// Begin counting immediately
    #[arg(long)]
    start: bool,
    /// Skip the release check at startup
    #[arg(long)]
    no_update_check: bool,
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Reset,
    CyclePreset,
    StopAlarm,
    Duration(String),
    Status,
    Version,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" | "t" | "toggle" => Command::Toggle,
            "r" | "reset" => Command::Reset,
            "c" | "cycle" => Command::CyclePreset,
            "s" | "stop" => Command::StopAlarm,
            "?" | "status" => Command::Status,
            "v" | "version" => Command::Version,
            "h" | "help" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ if line.starts_with(|c: char| c.is_ascii_digit()) => {
                Command::Duration(line.to_string())
            }
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args, config))
}

async fn session(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let sink = audio::sink_for(&config.alarm);
    let mut timer = TimerController::from_config(&config, Some(sink))?;
    if let Some(minutes) = args.minutes {
        timer.set_duration_input(&minutes.to_string())?;
    }

    println!("{HELP}");
    render(&timer, &timer.snapshot());
    if args.start {
        if let Some(event) = timer.start() {
            render(&timer, &event);
        }
    }

    let check_updates =
        config.updates.check_on_start && !args.no_update_check && !storage::is_dev();
    let update_check = deferred_update_check(config.updates.clone(), check_updates);
    tokio::pin!(update_check);
    let mut update_pending = true;

    let origin = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let deadline = wake_at(origin, timer.next_deadline());
        tokio::select! {
            _ = sleep_until(deadline) => {
                for event in timer.advance_to(origin.elapsed()) {
                    render(&timer, &event);
                }
            }
            line = lines.next_line(), if stdin_open => {
                // Catch up first so commands see the current clock.
                for event in timer.advance_to(origin.elapsed()) {
                    render(&timer, &event);
                }
                match line? {
                    Some(line) => {
                        if !handle(&mut timer, Command::parse(&line)) {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            event = &mut update_check, if update_pending => {
                update_pending = false;
                if let Some(event) = event {
                    render(&timer, &event);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        if !stdin_open && timer.next_deadline().is_none() {
            break;
        }
    }

    timer.stop_alarm();
    println!();
    Ok(())
}

/// Apply one command. Returns false to quit.
fn handle(timer: &mut TimerController, command: Command) -> bool {
    let event = match command {
        Command::Toggle => timer.toggle(),
        Command::Reset => Some(timer.reset()),
        Command::CyclePreset => Some(timer.cycle_preset()),
        Command::StopAlarm => timer.stop_alarm(),
        Command::Duration(text) => match timer.set_duration_input(&text) {
            Ok(event) => Some(event),
            Err(e) => {
                println!("\nerror: {e}");
                None
            }
        },
        Command::Status => {
            match serde_json::to_string_pretty(&timer.snapshot()) {
                Ok(json) => println!("\n{json}"),
                Err(e) => tracing::warn!("cannot serialise snapshot: {e}"),
            }
            None
        }
        Command::Version => {
            println!("\nCurrent version: v{}", env!("CARGO_PKG_VERSION"));
            None
        }
        Command::Help => {
            println!("\n{HELP}");
            None
        }
        Command::Quit => return false,
        Command::Unknown(text) => {
            println!("\nunknown command: {text:?} (h for help)");
            None
        }
    };
    if let Some(event) = event {
        render(timer, &event);
    }
    true
}

fn render(timer: &TimerController, event: &Event) {
    let icon = if timer.is_running() { "⏸" } else { "▶" };
    match event {
        Event::PresetCycled { minutes, display, .. } => {
            print!("\r{icon} {display}  [{minutes} min preset]");
        }
        Event::TimerCompleted { .. } => println!("\rPomodoro Complete!          "),
        Event::AlarmFired { .. } => {}
        Event::AlarmStopped { .. } => println!("alarm stopped"),
        Event::UpdateAvailable { latest, url, .. } => {
            println!("\nUpdate available: v{latest} {url}");
        }
        other => {
            let display = other.display().map_or_else(|| timer.display(), str::to_string);
            print!("\r{icon} {display}                   ");
        }
    }
    let _ = std::io::stdout().flush();
}

/// Wall-clock instant for a virtual deadline. `None` when there is nothing
/// scheduled or the deadline lies beyond what `Instant` can represent.
fn wake_at(origin: Instant, next: Option<Duration>) -> Option<Instant> {
    next.and_then(|d| origin.checked_add(d))
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn deferred_update_check(config: UpdateConfig, enabled: bool) -> Option<Event> {
    if !enabled {
        return None;
    }
    tokio::time::sleep(STARTUP_CHECK_DELAY).await;

    let checker = match UpdateChecker::new(&config.feed_url, env!("CARGO_PKG_VERSION")) {
        Ok(checker) => checker,
        Err(e) => {
            tracing::warn!("update check disabled: {e}");
            return None;
        }
    };
    match checker.check().await {
        Ok(status) => status.to_event(),
        Err(e) => {
            tracing::warn!("update check failed: {e}");
            None
        }
    }
}
