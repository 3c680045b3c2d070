//! Presentation-ready projection of the timer.

use serde::{Deserialize, Serialize};

use super::state::{TimerPhase, TimerStatus};

/// Read-only snapshot of everything a host needs to render the timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: TimerPhase,
    pub status: TimerStatus,
    pub remaining_secs: u64,
    /// Configured full length of the active phase.
    pub total_secs: u64,
    /// Countdown as zero-padded `MM:SS`; minutes run past 59.
    pub clock: String,
    /// Completed fraction of the active phase, 0.0 to 1.0.
    pub progress: f64,
    pub cycle_length: u32,
    /// Completed work phases within the current cycle, 0 to cycle_length - 1.
    pub cycle_position: u32,
    pub completed_pomodoros: u64,
    /// Work seconds accumulated this session.
    pub focus_seconds: u64,
    /// `focus_seconds` as `HH:MM:SS`.
    pub focus_clock: String,
}

/// Format a countdown as zero-padded `MM:SS`.
///
/// Minutes are not rolled into hours, so a 90 minute phase shows `90:00`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format an accumulating duration as `HH:MM:SS`.
pub fn format_stopwatch(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Completed fraction of a phase, clamped to `[0.0, 1.0]`.
///
/// A remaining value above the total (possible after shrinking a duration
/// mid-phase) reads as no progress rather than a negative fraction.
pub fn progress(total_secs: u64, remaining_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    let done = total_secs.saturating_sub(remaining_secs) as f64;
    (done / total_secs as f64).clamp(0.0, 1.0)
}
