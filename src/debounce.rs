//! Collapsing bursts of file events into a single rebuild.

use std::time::Duration;
use std::time::Instant;

/// The debounce window used when `--debounce` isn't given.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Leading-edge debounce state for one watcher.
///
/// The first event is accepted immediately and arms a timer for the debounce window. Every event
/// that arrives while the timer is pending is dropped. Events don't extend the window; once the
/// timer expires the next event is accepted and re-arms it.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    /// When the pending timer was armed, if one is.
    armed_at: Option<Instant>,
}

impl Debounce {
    /// Create a debouncer with the given window and no pending timer.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// The debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Is a timer pending at `now`?
    pub fn is_pending(&self, now: Instant) -> bool {
        match self.armed_at {
            Some(armed_at) => now.saturating_duration_since(armed_at) < self.window,
            None => false,
        }
    }

    /// Offer an event that arrived at `now`.
    ///
    /// Returns `true` and arms the timer if the event is accepted.
    pub fn accept(&mut self, now: Instant) -> bool {
        if self.is_pending(now) {
            return false;
        }
        self.armed_at = Some(now);
        true
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
