//! Wall-clock abstraction.
//!
//! The engine never reads the system time directly; it asks a [`Clock`].
//! Production code uses [`SystemClock`], tests use [`ManualClock`] to step
//! through hours of virtual time without sleeping.

use std::cell::Cell;
use std::rc::Rc;

/// Source of epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Real wall clock backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for tests.
///
/// Clones share the same instant, so a copy handed to the engine observes
/// every `advance` made by the test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
