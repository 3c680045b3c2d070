//! Host callbacks for timer lifecycle moments.
//!
//! The engine never renders, notifies, or plays audio itself. When
//! something happens that a host might want to surface, it calls the
//! matching method on the injected [`TimerHooks`]. All methods default to
//! no-ops so hosts implement only what they care about.

use crate::timer::TimerPhase;

/// Callbacks invoked by the engine as the timer moves through its life.
pub trait TimerHooks {
    /// The active phase changed, by completion or by explicit switch.
    fn phase_changed(&mut self, _phase: TimerPhase) {}

    /// A phase ran its countdown to zero. `duration_min` is the
    /// configured length of the completed phase.
    ///
    /// Not called for phases that expired while the process was gone;
    /// those are discovered at restore and silently reset.
    fn session_completed(&mut self, _completed: TimerPhase, _duration_min: u32) {}

    /// Show a completion notification. Called only when notifications
    /// are enabled in settings.
    fn notify(&mut self, _completed: TimerPhase, _next: TimerPhase) {}

    /// Play the completion sound. Called only when sound is enabled in
    /// settings.
    fn play_sound(&mut self) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl TimerHooks for NullHooks {}
