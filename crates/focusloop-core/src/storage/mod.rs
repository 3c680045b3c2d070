mod config;
pub mod database;
pub mod memory;

pub use config::Config;
pub use database::{Database, SessionRecord, Stats};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::CoreError;

/// Keyed string storage for timer state.
///
/// The engine talks to storage only through this trait so hosts can back
/// it with whatever they have: [`Database`] persists to SQLite,
/// [`MemoryStore`] keeps everything in process for tests.
///
/// Reads treat any backend failure as absence. Writes report failure to
/// the caller; the engine deliberately ignores those errors so a broken
/// store degrades persistence, never the countdown.
pub trait Store {
    /// Fetch a value, `None` when missing or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Returns the directory holding the database and config file.
///
/// FOCUSLOOP_DATA_DIR overrides the location outright. Otherwise this is
/// `~/.config/focusloop/`, or `~/.config/focusloop-dev/` when
/// FOCUSLOOP_ENV=dev.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(dir) = std::env::var("FOCUSLOOP_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
