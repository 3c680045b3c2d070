//! Timer engine implementation.
//!
//! The engine is a wall-clock-aware state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per second while the countdown should move. Each tick subtracts exactly
//! one second; wall time matters only at discontinuities (process restart,
//! host going invisible), where the stored snapshot is replayed against
//! the clock in a single step.
//!
//! ## State Transitions
//!
//! ```text
//! Idle <-> Running <-> Paused
//!            |
//!            v (remaining hits zero)
//!        completion: next phase, Idle or Running per auto-start
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings, store, clock, hooks);
//! engine.toggle();
//! // Once per second:
//! engine.tick();
//! ```

use crate::clock::Clock;
use crate::hooks::TimerHooks;
use crate::storage::Store;

use super::settings::TimerSettings;
use super::snapshot::{TimerSnapshot, COMPLETED_COUNT_KEY, FOCUS_SECONDS_KEY};
use super::state::{NavDirection, PhaseSource, RemainingTimes, TimerPhase, TimerStatus};
use super::view::{self, TimerView};

/// How long `toggle` stays swallowed after a completion fires.
///
/// A press aimed at a countdown that completed an instant earlier would
/// otherwise pause or restart the freshly selected phase.
pub const COMPLETION_COOLDOWN_MS: u64 = 1_000;

/// Second totals-reset request must arrive within this window to confirm.
pub const RESET_CONFIRM_WINDOW_MS: u64 = 4_000;

/// Focus seconds are flushed to the store at this cadence.
const FOCUS_PERSIST_EVERY_SECS: u64 = 5;

/// Outcome of a totals-reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsReset {
    /// First request; waiting for a confirming second one.
    Armed,
    /// Confirmed; counters were cleared.
    Cleared,
}

/// Core timer engine.
///
/// Owns the phase cycle, per-phase countdowns, session counters, and the
/// write-through snapshot that makes all of it survive a restart. Storage,
/// time, and host callbacks are injected; the engine itself never touches
/// the system clock or renders anything.
pub struct TimerEngine {
    settings: TimerSettings,
    phase: TimerPhase,
    status: TimerStatus,
    remaining: RemainingTimes,
    /// Lifetime completed work phases.
    completed_pomodoros: u64,
    /// Work seconds observed this session. Replayed wall time is never
    /// credited here, only ticks that actually ran.
    focus_seconds: u64,
    /// Set when a completion fires; swallows `toggle` until the cooldown
    /// passes or an explicit phase switch clears it.
    latched_at_ms: Option<u64>,
    /// Deadline for the confirming totals-reset request.
    reset_deadline_ms: Option<u64>,
    store: Box<dyn Store>,
    clock: Box<dyn Clock>,
    hooks: Box<dyn TimerHooks>,
}

impl TimerEngine {
    /// Create an engine and restore any persisted countdown.
    ///
    /// A stored snapshot that still has time left is adopted, with wall
    /// time since its timestamp charged against the running phase. A
    /// snapshot whose phase already expired is discarded: the engine comes
    /// up idle on a full work phase and no completion callbacks fire for
    /// sessions that ended while nobody was running.
    pub fn new(
        settings: TimerSettings,
        store: Box<dyn Store>,
        clock: Box<dyn Clock>,
        hooks: Box<dyn TimerHooks>,
    ) -> Self {
        let settings = settings.normalized();
        let mut engine = Self {
            phase: TimerPhase::Work,
            status: TimerStatus::Idle,
            remaining: settings.full_remaining(),
            settings,
            completed_pomodoros: 0,
            focus_seconds: 0,
            latched_at_ms: None,
            reset_deadline_ms: None,
            store,
            clock,
            hooks,
        };
        engine.completed_pomodoros = engine.read_counter(COMPLETED_COUNT_KEY);
        engine.focus_seconds = engine.read_counter(FOCUS_SECONDS_KEY);
        engine.restore();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Remaining seconds of the active phase.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining.get(self.phase)
    }

    pub fn remaining_times(&self) -> RemainingTimes {
        self.remaining
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    pub fn completed_pomodoros(&self) -> u64 {
        self.completed_pomodoros
    }

    pub fn focus_seconds(&self) -> u64 {
        self.focus_seconds
    }

    /// Completed work phases within the current cycle.
    pub fn cycle_position(&self) -> u32 {
        (self.completed_pomodoros % self.settings.cycle_length as u64) as u32
    }

    /// Build a presentation-ready projection of the current state.
    pub fn view(&self) -> TimerView {
        let total_secs = self.settings.duration_secs(self.phase);
        let remaining_secs = self.remaining.get(self.phase);
        TimerView {
            phase: self.phase,
            status: self.status,
            remaining_secs,
            total_secs,
            clock: view::format_clock(remaining_secs),
            progress: view::progress(total_secs, remaining_secs),
            cycle_length: self.settings.cycle_length,
            cycle_position: self.cycle_position(),
            completed_pomodoros: self.completed_pomodoros,
            focus_seconds: self.focus_seconds,
            focus_clock: view::format_stopwatch(self.focus_seconds),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start, pause, or resume the active phase.
    ///
    /// Swallowed during the completion cooldown so a press racing a
    /// completion cannot disturb the freshly selected phase.
    pub fn toggle(&mut self) {
        self.release_latch_if_expired();
        if self.latched_at_ms.is_some() {
            return;
        }
        match self.status {
            TimerStatus::Running => {
                self.status = TimerStatus::Paused;
                self.persist_snapshot();
            }
            TimerStatus::Idle | TimerStatus::Paused => {
                // Starting an exhausted phase begins it fresh.
                if self.remaining.get(self.phase) == 0 {
                    self.remaining
                        .set(self.phase, self.settings.duration_secs(self.phase));
                }
                self.status = TimerStatus::Running;
                self.persist_snapshot();
            }
        }
    }

    /// Step to the adjacent phase in cycle order and start it.
    pub fn navigate(&mut self, direction: NavDirection) {
        let target = match direction {
            NavDirection::Next => self.phase.next(),
            NavDirection::Prev => self.phase.prev(),
        };
        self.switch_phase(target, Some(PhaseSource::Arrow));
    }

    /// Switch to an arbitrary phase.
    ///
    /// A sourced switch (tab click, arrow key) starts the countdown
    /// immediately; a sourceless one lands idle and waits for `toggle`.
    pub fn set_phase(&mut self, phase: TimerPhase, source: Option<PhaseSource>) {
        self.switch_phase(phase, source);
    }

    /// Advance the countdown by exactly one second.
    ///
    /// The host calls this once per second while visible. Wall time is
    /// deliberately ignored here; missed seconds are charged by
    /// [`TimerEngine::on_visible`] instead of being replayed tick by tick.
    pub fn tick(&mut self) {
        self.release_latch_if_expired();
        if self.status != TimerStatus::Running {
            return;
        }

        let left = self.remaining.get(self.phase).saturating_sub(1);
        self.remaining.set(self.phase, left);

        if self.phase == TimerPhase::Work {
            self.focus_seconds += 1;
            if self.focus_seconds % FOCUS_PERSIST_EVERY_SECS == 0 {
                self.persist_focus();
            }
        }

        if left == 0 {
            self.complete(self.clock.now_ms());
        } else {
            self.persist_snapshot();
        }
    }

    /// Put the active phase back to its full duration and stop it.
    ///
    /// The stored snapshot is left alone: it still holds the last active
    /// countdown, which the next restore may offer back.
    pub fn reset_current_phase(&mut self) {
        self.latched_at_ms = None;
        self.remaining
            .set(self.phase, self.settings.duration_secs(self.phase));
        self.status = TimerStatus::Idle;
    }

    /// Two-step reset of the session counters.
    ///
    /// The first call arms a confirmation window; a second call within
    /// [`RESET_CONFIRM_WINDOW_MS`] zeroes the completed count and focus
    /// stopwatch and drops their persisted keys. An expired window re-arms
    /// instead of clearing. The countdown itself is untouched either way.
    pub fn request_totals_reset(&mut self) -> TotalsReset {
        let now = self.clock.now_ms();
        match self.reset_deadline_ms {
            Some(deadline) if now < deadline => {
                self.reset_deadline_ms = None;
                self.completed_pomodoros = 0;
                self.focus_seconds = 0;
                let _ = self.store.remove(COMPLETED_COUNT_KEY);
                let _ = self.store.remove(FOCUS_SECONDS_KEY);
                TotalsReset::Cleared
            }
            _ => {
                self.reset_deadline_ms = Some(now.saturating_add(RESET_CONFIRM_WINDOW_MS));
                TotalsReset::Armed
            }
        }
    }

    /// Apply new settings.
    ///
    /// When any phase duration changed, every phase countdown is reset to
    /// its new full value except the active phase while running or paused,
    /// which keeps its progress. The stored snapshot was taken under the
    /// old durations, so it is dropped and rewritten from live state.
    pub fn set_settings(&mut self, settings: TimerSettings) {
        let settings = settings.normalized();
        let durations_changed = self.settings.durations_differ(&settings);
        self.settings = settings;
        if !durations_changed {
            return;
        }
        for phase in TimerPhase::ORDER {
            if phase == self.phase && self.status.is_active() {
                continue;
            }
            self.remaining.set(phase, self.settings.duration_secs(phase));
        }
        self.clear_snapshot();
        self.persist_snapshot();
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// The host stopped watching (tab hidden, terminal detached).
    ///
    /// Stamps the snapshot so the time away can be charged on return.
    pub fn on_hidden(&mut self) {
        self.persist_snapshot();
        self.persist_focus();
    }

    /// The host is watching again after a gap in ticking.
    ///
    /// Replays the stored snapshot against the wall clock. A phase that
    /// ran out while away completes now, with callbacks; this is the live
    /// counterpart of the silent discard done at restore.
    pub fn on_visible(&mut self) {
        self.release_latch_if_expired();
        if self.status != TimerStatus::Running {
            return;
        }
        let Some(snap) = TimerSnapshot::load(self.store.as_ref()) else {
            return;
        };
        // A snapshot that does not match live state means writes were
        // failing; charging against it would corrupt the countdown.
        if snap.phase != self.phase || snap.status != TimerStatus::Running {
            return;
        }
        let now = self.clock.now_ms();
        let replayed = snap.replayed_remaining(now);
        self.remaining = snap.remaining_times;
        self.remaining.set(self.phase, replayed);
        if replayed == 0 {
            self.complete(now);
        } else {
            self.persist_snapshot();
        }
    }

    /// Final write before the process goes away.
    pub fn flush(&mut self) {
        self.persist_snapshot();
        self.persist_focus();
        self.persist_completed();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn restore(&mut self) {
        let Some(snap) = TimerSnapshot::load(self.store.as_ref()) else {
            return;
        };
        // Idle is never written; an idle snapshot is malformed.
        if !snap.status.is_active() {
            return;
        }
        let now = self.clock.now_ms();
        let replayed = snap.replayed_remaining(now);
        if replayed == 0 {
            // The phase expired while the process was gone. Come up on
            // defaults; the missed completion is not replayed.
            self.clear_snapshot();
            return;
        }
        self.phase = snap.phase;
        self.status = snap.status;
        self.remaining = snap.remaining_times;
        self.remaining.set(snap.phase, replayed);
        // Fresh timestamp, otherwise a second restore would charge the
        // same elapsed time again.
        self.persist_snapshot();
    }

    fn complete(&mut self, now_ms: u64) {
        let completed = self.phase;
        let next = if completed == TimerPhase::Work {
            self.completed_pomodoros += 1;
            self.persist_completed();
            if self.completed_pomodoros % self.settings.cycle_length as u64 == 0 {
                TimerPhase::LongBreak
            } else {
                TimerPhase::ShortBreak
            }
        } else {
            TimerPhase::Work
        };

        let duration_min = self.settings.duration_minutes(completed);
        self.hooks.session_completed(completed, duration_min);
        if self.settings.notifications_enabled {
            self.hooks.notify(completed, next);
        }
        if self.settings.sound_enabled {
            self.hooks.play_sound();
        }

        // Both sides of the transition start fresh next time around.
        self.remaining
            .set(completed, self.settings.duration_secs(completed));
        self.remaining.set(next, self.settings.duration_secs(next));
        self.phase = next;
        self.hooks.phase_changed(next);

        let auto_start = if next.is_break() {
            self.settings.auto_start_breaks
        } else {
            self.settings.auto_start_pomodoros
        };
        self.status = if auto_start {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        };
        self.latched_at_ms = Some(now_ms);
        self.persist_snapshot();
    }

    fn switch_phase(&mut self, target: TimerPhase, source: Option<PhaseSource>) {
        // Explicit switches bypass the completion cooldown.
        self.latched_at_ms = None;
        let changed = target != self.phase;
        self.phase = target;
        if self.remaining.get(target) == 0 {
            self.remaining
                .set(target, self.settings.duration_secs(target));
        }
        self.status = if source.is_some() {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        };
        if changed {
            self.hooks.phase_changed(target);
        }
        self.persist_snapshot();
    }

    fn release_latch_if_expired(&mut self) {
        if let Some(armed) = self.latched_at_ms {
            if self.clock.now_ms().saturating_sub(armed) >= COMPLETION_COOLDOWN_MS {
                self.latched_at_ms = None;
            }
        }
    }

    fn read_counter(&self, key: &str) -> u64 {
        self.store
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Write the snapshot through to the store. Only running or paused
    /// countdowns are written; a transition to idle leaves the previous
    /// active snapshot behind rather than erasing it. Failures degrade
    /// persistence, never the live state.
    fn persist_snapshot(&mut self) {
        if !self.status.is_active() {
            return;
        }
        let snap = TimerSnapshot {
            phase: self.phase,
            status: self.status,
            remaining_times: self.remaining,
            timestamp_ms: self.clock.now_ms(),
        };
        let _ = snap.save(self.store.as_ref());
    }

    fn clear_snapshot(&mut self) {
        let _ = TimerSnapshot::clear(self.store.as_ref());
    }

    fn persist_focus(&mut self) {
        let _ = self
            .store
            .set(FOCUS_SECONDS_KEY, &self.focus_seconds.to_string());
    }

    fn persist_completed(&mut self) {
        let _ = self
            .store
            .set(COMPLETED_COUNT_KEY, &self.completed_pomodoros.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::hooks::NullHooks;
    use crate::storage::MemoryStore;
    use crate::timer::snapshot::SNAPSHOT_KEY;

    const EPOCH: u64 = 1_700_000_000_000;

    fn engine_with(settings: TimerSettings) -> (TimerEngine, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::at(EPOCH);
        let engine = TimerEngine::new(
            settings,
            Box::new(store.clone()),
            Box::new(clock.clone()),
            Box::new(NullHooks),
        );
        (engine, store, clock)
    }

    /// Run the active phase to completion: one tick per second of
    /// clock time, the way a host drives the engine.
    fn run_out_phase(engine: &mut TimerEngine, clock: &ManualClock) {
        let secs = engine.remaining_secs();
        for _ in 0..secs {
            clock.advance_secs(1);
            engine.tick();
        }
    }

    #[derive(Debug, Default, Clone)]
    struct RecordingHooks {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl TimerHooks for RecordingHooks {
        fn phase_changed(&mut self, phase: TimerPhase) {
            self.events.borrow_mut().push(format!("phase:{}", phase.as_str()));
        }
        fn session_completed(&mut self, completed: TimerPhase, duration_min: u32) {
            self.events
                .borrow_mut()
                .push(format!("done:{}:{duration_min}", completed.as_str()));
        }
        fn notify(&mut self, completed: TimerPhase, next: TimerPhase) {
            self.events
                .borrow_mut()
                .push(format!("notify:{}>{}", completed.as_str(), next.as_str()));
        }
        fn play_sound(&mut self) {
            self.events.borrow_mut().push("sound".into());
        }
    }

    #[test]
    fn fresh_engine_is_idle_on_full_work_phase() {
        let (engine, store, _) = engine_with(TimerSettings::default());
        assert_eq!(engine.phase(), TimerPhase::Work);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 25 * 60);
        // Idle state is never snapshotted.
        assert!(store.get(SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn toggle_cycles_run_pause_resume() {
        let (mut engine, store, _) = engine_with(TimerSettings::default());
        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Running);
        assert!(store.get(SNAPSHOT_KEY).is_some());

        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Paused);

        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn tick_subtracts_exactly_one_second_and_only_while_running() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1500);

        engine.toggle();
        // Clock jumps do not change what one tick subtracts.
        clock.advance_secs(30);
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1499);

        engine.toggle();
        engine.tick();
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn work_ticks_feed_the_focus_stopwatch() {
        let (mut engine, store, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..7 {
            clock.advance_secs(1);
            engine.tick();
        }
        assert_eq!(engine.focus_seconds(), 7);
        // Flushed on every fifth second, so the store lags at 5.
        assert_eq!(store.get(FOCUS_SECONDS_KEY).as_deref(), Some("5"));
    }

    #[test]
    fn break_ticks_do_not_feed_the_focus_stopwatch() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.set_phase(TimerPhase::ShortBreak, Some(PhaseSource::Tab));
        for _ in 0..5 {
            clock.advance_secs(1);
            engine.tick();
        }
        assert_eq!(engine.focus_seconds(), 0);
    }

    #[test]
    fn work_completion_selects_short_break_mid_cycle() {
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, store, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);

        assert_eq!(engine.phase(), TimerPhase::ShortBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.completed_pomodoros(), 1);
        assert_eq!(engine.cycle_position(), 1);
        assert_eq!(store.get(COMPLETED_COUNT_KEY).as_deref(), Some("1"));
        // Completed phase is back at full for its next visit.
        assert_eq!(engine.remaining_times().work, 60);
    }

    #[test]
    fn cycle_end_earns_the_long_break() {
        let settings = TimerSettings {
            work_minutes: 1,
            short_break_minutes: 1,
            cycle_length: 2,
            auto_start_breaks: true,
            auto_start_pomodoros: true,
            ..TimerSettings::default()
        };
        let (mut engine, _, clock) = engine_with(settings);
        engine.toggle();

        // Work #1 -> short break -> work #2 -> long break.
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.phase(), TimerPhase::ShortBreak);
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.phase(), TimerPhase::Work);
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.phase(), TimerPhase::LongBreak);
        assert_eq!(engine.completed_pomodoros(), 2);
        assert_eq!(engine.cycle_position(), 0);
    }

    #[test]
    fn break_completion_returns_to_work() {
        let settings = TimerSettings {
            short_break_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, _, clock) = engine_with(settings);
        engine.set_phase(TimerPhase::ShortBreak, Some(PhaseSource::Tab));
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.phase(), TimerPhase::Work);
        assert_eq!(engine.completed_pomodoros(), 0);
    }

    #[test]
    fn auto_start_breaks_keeps_the_countdown_running() {
        let settings = TimerSettings {
            work_minutes: 1,
            auto_start_breaks: true,
            ..TimerSettings::default()
        };
        let (mut engine, store, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.phase(), TimerPhase::ShortBreak);
        assert_eq!(engine.status(), TimerStatus::Running);
        assert!(store.get(SNAPSHOT_KEY).is_some());
    }

    #[test]
    fn completion_without_auto_start_keeps_the_last_snapshot() {
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, store, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.status(), TimerStatus::Idle);
        // Idle is not written, so the final running write stays behind.
        let snap = TimerSnapshot::load(&store).unwrap();
        assert_eq!(snap.status, TimerStatus::Running);
        assert_eq!(snap.remaining_times.work, 1);
    }

    #[test]
    fn toggle_is_swallowed_during_completion_cooldown() {
        let settings = TimerSettings {
            work_minutes: 1,
            auto_start_breaks: true,
            ..TimerSettings::default()
        };
        let (mut engine, _, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.status(), TimerStatus::Running);

        // Press lands right after the completion; ignored.
        clock.advance_ms(200);
        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Running);

        // After the cooldown the same press works.
        clock.advance_ms(COMPLETION_COOLDOWN_MS);
        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Paused);
    }

    #[test]
    fn phase_switch_clears_the_completion_cooldown() {
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, _, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);

        // Still latched, but an explicit switch acts immediately.
        engine.navigate(NavDirection::Next);
        assert_eq!(engine.phase(), TimerPhase::LongBreak);
        assert_eq!(engine.status(), TimerStatus::Running);
        // And toggle works right away again.
        engine.toggle();
        assert_eq!(engine.status(), TimerStatus::Paused);
    }

    #[test]
    fn navigation_wraps_and_auto_starts() {
        let (mut engine, _, _) = engine_with(TimerSettings::default());
        engine.navigate(NavDirection::Prev);
        assert_eq!(engine.phase(), TimerPhase::LongBreak);
        assert_eq!(engine.status(), TimerStatus::Running);
        engine.navigate(NavDirection::Next);
        assert_eq!(engine.phase(), TimerPhase::Work);
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn switching_away_preserves_the_left_phase() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..10 {
            clock.advance_secs(1);
            engine.tick();
        }
        engine.set_phase(TimerPhase::ShortBreak, Some(PhaseSource::Tab));
        assert_eq!(engine.remaining_times().work, 1490);
        engine.set_phase(TimerPhase::Work, Some(PhaseSource::Tab));
        assert_eq!(engine.remaining_secs(), 1490);
    }

    #[test]
    fn sourceless_phase_switch_lands_idle_and_keeps_the_snapshot() {
        let (mut engine, store, _) = engine_with(TimerSettings::default());
        engine.toggle();
        assert!(store.get(SNAPSHOT_KEY).is_some());

        engine.set_phase(TimerPhase::LongBreak, None);
        assert_eq!(engine.phase(), TimerPhase::LongBreak);
        assert_eq!(engine.status(), TimerStatus::Idle);
        // The pre-switch running snapshot is retained, not replaced.
        let snap = TimerSnapshot::load(&store).unwrap();
        assert_eq!(snap.phase, TimerPhase::Work);
        assert_eq!(snap.status, TimerStatus::Running);
    }

    #[test]
    fn reset_refills_the_active_phase_and_stops() {
        let (mut engine, store, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..30 {
            clock.advance_secs(1);
            engine.tick();
        }
        engine.reset_current_phase();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 1500);
        // The pre-reset countdown stays stored for possible recovery.
        let snap = TimerSnapshot::load(&store).unwrap();
        assert_eq!(snap.remaining_times.work, 1470);
    }

    #[test]
    fn reset_leaves_other_phases_and_totals_untouched() {
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, _, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.completed_pomodoros(), 1);

        // Leave some progress in work, then burn a little short break.
        engine.set_phase(TimerPhase::Work, Some(PhaseSource::Tab));
        for _ in 0..2 {
            clock.advance_secs(1);
            engine.tick();
        }
        engine.set_phase(TimerPhase::ShortBreak, Some(PhaseSource::Tab));
        clock.advance_secs(1);
        engine.tick();

        engine.reset_current_phase();
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 300);
        // Only the active phase is refilled.
        assert_eq!(engine.remaining_times().work, 58);
        assert_eq!(engine.remaining_times().long_break, 900);
        assert_eq!(engine.completed_pomodoros(), 1);
        assert_eq!(engine.focus_seconds(), 62);
    }

    #[test]
    fn totals_reset_needs_a_confirming_second_request() {
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut engine, store, clock) = engine_with(settings);
        engine.toggle();
        run_out_phase(&mut engine, &clock);
        assert_eq!(engine.completed_pomodoros(), 1);
        assert!(engine.focus_seconds() > 0);

        assert_eq!(engine.request_totals_reset(), TotalsReset::Armed);
        // Counters untouched until confirmed.
        assert_eq!(engine.completed_pomodoros(), 1);

        clock.advance_ms(1_000);
        assert_eq!(engine.request_totals_reset(), TotalsReset::Cleared);
        assert_eq!(engine.completed_pomodoros(), 0);
        assert_eq!(engine.focus_seconds(), 0);
        // Keys are dropped, not rewritten as zero.
        assert!(store.get(COMPLETED_COUNT_KEY).is_none());
        assert!(store.get(FOCUS_SECONDS_KEY).is_none());
    }

    #[test]
    fn totals_reset_leaves_the_countdown_alone() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..12 {
            clock.advance_secs(1);
            engine.tick();
        }
        engine.request_totals_reset();
        clock.advance_ms(500);
        engine.request_totals_reset();
        assert_eq!(engine.status(), TimerStatus::Running);
        assert_eq!(engine.remaining_secs(), 1488);
    }

    #[test]
    fn totals_reset_window_expires_and_rearms() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        assert_eq!(engine.request_totals_reset(), TotalsReset::Armed);
        clock.advance_ms(RESET_CONFIRM_WINDOW_MS);
        // Too late; this request arms a new window instead.
        assert_eq!(engine.request_totals_reset(), TotalsReset::Armed);
        clock.advance_ms(RESET_CONFIRM_WINDOW_MS - 1);
        assert_eq!(engine.request_totals_reset(), TotalsReset::Cleared);
    }

    #[test]
    fn duration_change_spares_only_the_active_countdown() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..60 {
            clock.advance_secs(1);
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), 1440);

        let new = TimerSettings {
            work_minutes: 50,
            short_break_minutes: 10,
            ..TimerSettings::default()
        };
        engine.set_settings(new);

        // Running work phase keeps its progress under the old length.
        assert_eq!(engine.remaining_secs(), 1440);
        assert_eq!(engine.remaining_times().short_break, 600);
        assert_eq!(engine.remaining_times().long_break, 900);
    }

    #[test]
    fn duration_change_while_idle_resets_everything() {
        let (mut engine, store, _) = engine_with(TimerSettings::default());
        let new = TimerSettings {
            work_minutes: 30,
            ..TimerSettings::default()
        };
        engine.set_settings(new);
        assert_eq!(engine.remaining_secs(), 1800);
        assert!(store.get(SNAPSHOT_KEY).is_none());
    }

    #[test]
    fn flag_only_settings_change_keeps_countdowns() {
        let (mut engine, _, clock) = engine_with(TimerSettings::default());
        engine.toggle();
        for _ in 0..5 {
            clock.advance_secs(1);
            engine.tick();
        }
        let new = TimerSettings {
            auto_start_breaks: true,
            cycle_length: 6,
            ..TimerSettings::default()
        };
        engine.set_settings(new);
        assert_eq!(engine.remaining_secs(), 1495);
        assert_eq!(engine.settings().cycle_length, 6);
    }

    #[test]
    fn completion_fires_hooks_in_order() {
        let hooks = RecordingHooks::default();
        let events = hooks.events.clone();
        let settings = TimerSettings {
            work_minutes: 1,
            ..TimerSettings::default()
        };
        let store = MemoryStore::new();
        let clock = ManualClock::at(EPOCH);
        let mut engine = TimerEngine::new(
            settings,
            Box::new(store),
            Box::new(clock.clone()),
            Box::new(hooks),
        );
        engine.toggle();
        run_out_phase(&mut engine, &clock);

        assert_eq!(
            events.borrow().as_slice(),
            ["done:work:1", "notify:work>short_break", "sound", "phase:short_break"]
        );
    }

    #[test]
    fn disabled_alerts_suppress_notify_and_sound() {
        let hooks = RecordingHooks::default();
        let events = hooks.events.clone();
        let settings = TimerSettings {
            work_minutes: 1,
            notifications_enabled: false,
            sound_enabled: false,
            ..TimerSettings::default()
        };
        let store = MemoryStore::new();
        let clock = ManualClock::at(EPOCH);
        let mut engine = TimerEngine::new(
            settings,
            Box::new(store),
            Box::new(clock.clone()),
            Box::new(hooks),
        );
        engine.toggle();
        run_out_phase(&mut engine, &clock);

        assert_eq!(
            events.borrow().as_slice(),
            ["done:work:1", "phase:short_break"]
        );
    }
}
