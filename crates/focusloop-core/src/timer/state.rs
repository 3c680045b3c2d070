//! Timer vocabulary: phases, statuses, per-phase remaining time.

use serde::{Deserialize, Serialize};

/// Which duration bucket is active.
///
/// Phases cycle in the fixed order work -> short break -> long break,
/// wrapping in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    /// Cyclic order used by arrow navigation.
    pub const ORDER: [TimerPhase; 3] = [
        TimerPhase::Work,
        TimerPhase::ShortBreak,
        TimerPhase::LongBreak,
    ];

    pub fn next(self) -> Self {
        match self {
            TimerPhase::Work => TimerPhase::ShortBreak,
            TimerPhase::ShortBreak => TimerPhase::LongBreak,
            TimerPhase::LongBreak => TimerPhase::Work,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            TimerPhase::Work => TimerPhase::LongBreak,
            TimerPhase::ShortBreak => TimerPhase::Work,
            TimerPhase::LongBreak => TimerPhase::ShortBreak,
        }
    }

    pub fn is_break(self) -> bool {
        self != TimerPhase::Work
    }

    /// Stable string form, also used as the SQLite column value.
    pub fn as_str(self) -> &'static str {
        match self {
            TimerPhase::Work => "work",
            TimerPhase::ShortBreak => "short_break",
            TimerPhase::LongBreak => "long_break",
        }
    }

    /// Human label for host display.
    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Work => "Work",
            TimerPhase::ShortBreak => "Short Break",
            TimerPhase::LongBreak => "Long Break",
        }
    }
}

/// Countdown status of the active phase.
///
/// `Idle` means a phase is selected but not counting (never started, reset,
/// or completed and waiting for a manual start). `Paused` freezes the
/// countdown at its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    /// Running or Paused -- the states worth snapshotting.
    pub fn is_active(self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

/// Remaining seconds per phase, maintained independently so switching
/// phases does not lose the progress of the phase being left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTimes {
    pub work: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl RemainingTimes {
    pub fn get(&self, phase: TimerPhase) -> u64 {
        match phase {
            TimerPhase::Work => self.work,
            TimerPhase::ShortBreak => self.short_break,
            TimerPhase::LongBreak => self.long_break,
        }
    }

    pub fn set(&mut self, phase: TimerPhase, secs: u64) {
        match phase {
            TimerPhase::Work => self.work = secs,
            TimerPhase::ShortBreak => self.short_break = secs,
            TimerPhase::LongBreak => self.long_break = secs,
        }
    }
}

/// Direction for arrow navigation through the phase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Next,
    Prev,
}

/// Origin of an external phase override.
///
/// Tab clicks and arrow presses auto-start the countdown; an override with
/// no source (programmatic) lands in `Idle` and requires a manual start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseSource {
    Tab,
    Arrow,
}
