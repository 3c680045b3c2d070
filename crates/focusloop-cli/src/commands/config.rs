use clap::Subcommand;
use focusloop_core::storage::Database;
use focusloop_core::{Config, NullHooks, SystemClock, TimerEngine, TimerSettings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.work_minutes", "notifications.sound")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            let before = config.settings();
            config.set(&key, &value)?;
            apply_to_stored_timer(before, config.settings())?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load_or_default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let before = Config::load_or_default().settings();
            let config = Config::default();
            config.save()?;
            apply_to_stored_timer(before, config.settings())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

/// Rewrite the stored countdown snapshot after a duration change.
///
/// The snapshot in the database was written under the old durations and
/// must not be replayed against the new ones. Restoring it under the old
/// settings and then applying the new ones keeps an in-progress countdown
/// intact while every other phase adopts its new length.
fn apply_to_stored_timer(
    before: TimerSettings,
    after: TimerSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    if !before.durations_differ(&after) {
        return Ok(());
    }
    let store = Database::open()?;
    let mut engine = TimerEngine::new(
        before,
        Box::new(store),
        Box::new(SystemClock),
        Box::new(NullHooks),
    );
    engine.set_settings(after);
    Ok(())
}
