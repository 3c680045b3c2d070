mod engine;
mod settings;
mod snapshot;
mod state;
mod view;

pub use engine::{
    TimerEngine, TotalsReset, COMPLETION_COOLDOWN_MS, RESET_CONFIRM_WINDOW_MS,
};
pub use settings::TimerSettings;
pub use snapshot::{
    TimerSnapshot, COMPLETED_COUNT_KEY, FOCUS_SECONDS_KEY, SNAPSHOT_KEY,
};
pub use state::{NavDirection, PhaseSource, RemainingTimes, TimerPhase, TimerStatus};
pub use view::{format_clock, format_stopwatch, TimerView};
