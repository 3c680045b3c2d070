//! # Focusloop Core Library
//!
//! This library provides the core business logic for the Focusloop Pomodoro
//! timer. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI being a thin layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A state machine driven by one caller tick per second,
//!   with wall-clock replay of stored snapshots covering every gap in
//!   ticking (restart, hidden host, suspended machine)
//! - **Storage**: SQLite-based session storage and TOML-based configuration,
//!   plus a pluggable key-value [`Store`] the engine writes through to
//! - **Hooks**: Host callbacks for completions, notifications and sound
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerSnapshot`]: Persisted countdown and its wall-clock replay
//! - [`Database`]: Session and statistics persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod hooks;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use hooks::{NullHooks, TimerHooks};
pub use storage::{Config, Database, MemoryStore, SessionRecord, Stats, Store};
pub use timer::{
    NavDirection, PhaseSource, RemainingTimes, TimerEngine, TimerPhase, TimerSettings,
    TimerSnapshot, TimerStatus, TimerView, TotalsReset,
};
