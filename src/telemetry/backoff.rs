//! Exponential backoff state for the publisher task.
//!
//! The delay doubles on each consecutive failed delivery up to a ceiling and
//! snaps back to the base on any success.  There is no terminal state — the
//! publisher retries forever.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Backoff
// ---------------------------------------------------------------------------

/// Owned exclusively by the publisher task; never shared.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// Create a backoff starting at `base`, doubling up to `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            current: base,
            base,
            max,
        }
    }

    /// Delay to sleep after the failure that just happened.
    ///
    /// Returns the current delay, then doubles it (capped at `max`) for the
    /// next consecutive failure.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Snap back to the base delay after a successful delivery.
    pub fn reset(&mut self) {
        self.current = self.base;
    }

    /// Returns `true` while no failure streak is in progress.
    pub fn is_base(&self) -> bool {
        self.current == self.base
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
