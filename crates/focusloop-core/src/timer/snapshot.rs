//! Persisted countdown snapshot and wall-clock replay.
//!
//! While the timer is running or paused, the engine writes its state to
//! the store on every mutation. After a process restart or a long pause
//! in ticking, replaying the snapshot against the current wall clock
//! recovers where the countdown really stands. Wall time is authoritative;
//! missed ticks are charged in one step, never replayed one by one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::Store;

use super::state::{RemainingTimes, TimerPhase, TimerStatus};

/// Store key holding the active-countdown snapshot.
pub const SNAPSHOT_KEY: &str = "running_snapshot";
/// Store key holding accumulated work seconds for the session.
pub const FOCUS_SECONDS_KEY: &str = "session_focus_seconds";
/// Store key holding the lifetime completed work-phase count.
pub const COMPLETED_COUNT_KEY: &str = "completed_pomodoros";

/// Countdown state written through while the timer is running or paused.
///
/// `timestamp_ms` is the wall-clock instant the snapshot was taken.
/// Replay charges the wall time since then against the snapshotted phase,
/// but only when the status is `Running`; a paused countdown owes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub status: TimerStatus,
    #[serde(rename = "remainingTimes")]
    pub remaining_times: RemainingTimes,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

impl TimerSnapshot {
    /// Read and parse the stored snapshot.
    ///
    /// Anything unreadable, missing or malformed, counts as absent.
    pub fn load(store: &dyn Store) -> Option<Self> {
        let raw = store.get(SNAPSHOT_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Serialize and write the snapshot.
    pub fn save(&self, store: &dyn Store) -> Result<(), CoreError> {
        let json = serde_json::to_string(self)?;
        store.set(SNAPSHOT_KEY, &json)
    }

    /// Drop the stored snapshot.
    pub fn clear(store: &dyn Store) -> Result<(), CoreError> {
        store.remove(SNAPSHOT_KEY)
    }

    /// Whole seconds of wall time since the snapshot was taken.
    ///
    /// Sub-second remainders are floored away and a clock that moved
    /// backwards counts as no time at all.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms) / 1000
    }

    /// Remaining seconds of the snapshotted phase after charging elapsed
    /// wall time.
    ///
    /// Only the active phase is charged; the other phases keep their
    /// stored values. Zero means the phase expired while nobody was
    /// ticking.
    pub fn replayed_remaining(&self, now_ms: u64) -> u64 {
        let stored = self.remaining_times.get(self.phase);
        match self.status {
            TimerStatus::Running => stored.saturating_sub(self.elapsed_secs(now_ms)),
            _ => stored,
        }
    }
}
