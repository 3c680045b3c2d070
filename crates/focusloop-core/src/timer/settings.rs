//! Host-supplied timer configuration.
//!
//! Durations are configured in whole minutes and converted to seconds for
//! the countdown. Values are never rejected: out-of-range input is clamped
//! by [`TimerSettings::normalized`], which the engine applies on the way in.

use serde::{Deserialize, Serialize};

use super::state::{RemainingTimes, TimerPhase};

/// Everything the host configures on the timer.
///
/// Auto-start flags are read only at the moment of a phase transition.
/// The alert flags are forwarded untouched to the completion hook; the
/// engine never plays or renders anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Work phase length in minutes.
    pub work_minutes: u32,
    /// Short break length in minutes.
    pub short_break_minutes: u32,
    /// Long break length in minutes.
    pub long_break_minutes: u32,
    /// Work phases per cycle; the last one is followed by a long break.
    pub cycle_length: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycle_length: 4,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            notifications_enabled: true,
            sound_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Clamp durations and cycle length to at least 1.
    pub fn normalized(mut self) -> Self {
        self.work_minutes = self.work_minutes.max(1);
        self.short_break_minutes = self.short_break_minutes.max(1);
        self.long_break_minutes = self.long_break_minutes.max(1);
        self.cycle_length = self.cycle_length.max(1);
        self
    }

    /// Configured length of a phase in minutes.
    pub fn duration_minutes(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Work => self.work_minutes,
            TimerPhase::ShortBreak => self.short_break_minutes,
            TimerPhase::LongBreak => self.long_break_minutes,
        }
    }

    /// Configured length of a phase in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_secs(&self, phase: TimerPhase) -> u64 {
        (self.duration_minutes(phase) as u64).saturating_mul(60)
    }

    /// Full remaining times for a freshly idle timer.
    pub fn full_remaining(&self) -> RemainingTimes {
        RemainingTimes {
            work: self.duration_secs(TimerPhase::Work),
            short_break: self.duration_secs(TimerPhase::ShortBreak),
            long_break: self.duration_secs(TimerPhase::LongBreak),
        }
    }

    /// True when any of the three phase durations differs from `other`.
    ///
    /// Cycle length and the boolean flags do not count: only duration
    /// changes invalidate a persisted snapshot.
    pub fn durations_differ(&self, other: &TimerSettings) -> bool {
        self.work_minutes != other.work_minutes
            || self.short_break_minutes != other.short_break_minutes
            || self.long_break_minutes != other.long_break_minutes
    }
}
