use std::io::Write as _;
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Subcommand;
use focusloop_core::storage::{Config, Database};
use focusloop_core::timer::{
    NavDirection, PhaseSource, TimerEngine, TimerPhase, TimerStatus, TotalsReset,
};
use focusloop_core::{SystemClock, TimerHooks};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start, pause, or resume the current phase
    Toggle,
    /// Jump to the next phase and start it
    Next,
    /// Jump to the previous phase and start it
    Prev,
    /// Select a phase directly
    Phase {
        /// work, short_break, or long_break
        phase: String,
        /// Selection source: tab and arrow auto-start, none just selects
        #[arg(long, default_value = "tab")]
        source: String,
    },
    /// Put the current phase back to its full duration
    Reset,
    /// Clear the pomodoro count and the focus stopwatch
    ResetTotals {
        /// Skip the confirmation step
        #[arg(long)]
        yes: bool,
    },
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground, updating once per second
    Watch {
        /// Stop after this many ticks instead of running until the phase ends
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Records finished sessions and surfaces completion events on the terminal.
struct CliHooks {
    db: Database,
}

impl TimerHooks for CliHooks {
    fn session_completed(&mut self, completed: TimerPhase, duration_min: u32) {
        if let Err(e) = self.db.record_session(completed, duration_min, Utc::now()) {
            eprintln!("warning: failed to record session: {e}");
        }
    }

    fn notify(&mut self, completed: TimerPhase, next: TimerPhase) {
        println!("{} finished. up next: {}", completed.label(), next.label());
    }

    fn play_sound(&mut self) {
        // Terminal bell is as close to a chime as a CLI gets.
        print!("\x07");
    }
}

fn parse_phase(s: &str) -> Option<TimerPhase> {
    let lower = s.to_lowercase();
    match lower.as_str() {
        "work" | "focus" => Some(TimerPhase::Work),
        "short_break" | "short-break" | "short" => Some(TimerPhase::ShortBreak),
        "long_break" | "long-break" | "long" => Some(TimerPhase::LongBreak),
        _ => None,
    }
}

/// The outer Option is parse success; the inner one is what `set_phase`
/// takes, where `None` selects without auto-starting.
fn parse_source(s: &str) -> Option<Option<PhaseSource>> {
    let lower = s.to_lowercase();
    match lower.as_str() {
        "tab" => Some(Some(PhaseSource::Tab)),
        "arrow" => Some(Some(PhaseSource::Arrow)),
        "none" => Some(None),
        _ => None,
    }
}

fn print_view(engine: &TimerEngine) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&engine.view())?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = Database::open()?;
    // Second connection so session history writes do not go through the
    // engine's key-value store handle.
    let recorder = Database::open()?;
    let mut engine = TimerEngine::new(
        config.settings(),
        Box::new(store),
        Box::new(SystemClock),
        Box::new(CliHooks { db: recorder }),
    );

    // A confirmed totals reset drops the persisted counters; flushing
    // afterwards would write them straight back. Status only reads.
    let flush_after = !matches!(
        action,
        TimerAction::ResetTotals { .. } | TimerAction::Status
    );

    match action {
        TimerAction::Toggle => {
            engine.toggle();
            print_view(&engine)?;
        }
        TimerAction::Next => {
            engine.navigate(NavDirection::Next);
            print_view(&engine)?;
        }
        TimerAction::Prev => {
            engine.navigate(NavDirection::Prev);
            print_view(&engine)?;
        }
        TimerAction::Phase { phase, source } => {
            let parsed = parse_phase(&phase).ok_or_else(|| {
                format!("unknown phase '{phase}' (expected work, short_break or long_break)")
            })?;
            let source = parse_source(&source)
                .ok_or_else(|| format!("unknown source '{source}' (expected tab, arrow or none)"))?;
            engine.set_phase(parsed, source);
            print_view(&engine)?;
        }
        TimerAction::Reset => {
            engine.reset_current_phase();
            print_view(&engine)?;
        }
        TimerAction::ResetTotals { yes } => {
            let outcome = match engine.request_totals_reset() {
                TotalsReset::Armed if yes => engine.request_totals_reset(),
                first => first,
            };
            match outcome {
                TotalsReset::Cleared => println!("{{\"type\": \"totals_cleared\"}}"),
                TotalsReset::Armed => println!("not cleared; run again with --yes to confirm"),
            }
        }
        TimerAction::Status => {
            print_view(&engine)?;
        }
        TimerAction::Watch { ticks } => {
            watch(&mut engine, ticks)?;
        }
    }

    if flush_after {
        engine.flush();
    }
    Ok(())
}

/// Foreground countdown loop.
///
/// Sleeps one second at a time and only reschedules after the engine has
/// been updated, so a late wakeup never stacks extra ticks. A wakeup two or
/// more seconds late (laptop lid closed, machine suspended) is treated like
/// coming back to a hidden window: the gap is charged through the persisted
/// snapshot instead of being replayed tick by tick.
fn watch(engine: &mut TimerEngine, ticks: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    if engine.status() != TimerStatus::Running {
        println!("timer is {}; run `timer toggle` first", engine.status().as_str());
        return Ok(());
    }

    let mut done = 0u64;
    let mut last = Instant::now();
    loop {
        if let Some(limit) = ticks {
            if done >= limit {
                break;
            }
        }
        if engine.status() != TimerStatus::Running {
            break;
        }

        std::thread::sleep(Duration::from_millis(1_000));
        let woke = Instant::now();
        if woke.duration_since(last) >= Duration::from_secs(2) {
            engine.on_visible();
        } else {
            engine.tick();
        }
        last = woke;
        done += 1;

        let view = engine.view();
        print!(
            "\r{:<11} {}  pomodoros: {}  ",
            view.phase.label(),
            view.clock,
            view.completed_pomodoros
        );
        std::io::stdout().flush()?;
    }
    println!();
    Ok(())
}
