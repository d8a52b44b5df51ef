#![forbid(unsafe_code)]

//! Debounced render scheduling.
//!
//! Bursts of mutations coalesce into one placement pass: each new request
//! restarts a short delay, while a hard deadline pinned at the first
//! request of the burst bounds worst-case latency. Time is passed in
//! explicitly so tests drive the clock.
//!
//! # Invariants
//!
//! | ID       | Invariant                                            |
//! |----------|------------------------------------------------------|
//! | LATEST   | the final request of a burst is never dropped        |
//! | BOUNDED  | a pending pass fires within `max_wait` of the burst  |
//! | SINGLE   | at most one pass fires per burst                     |

use std::time::{Duration, Instant};

/// Debounce state for placement passes.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    delay: Duration,
    max_wait: Option<Duration>,
    dirty: bool,
    armed_at: Option<Instant>,
    deadline: Option<Instant>,
}

impl RenderScheduler {
    /// Scheduler with the given debounce delay and optional deadline cap.
    #[must_use]
    pub fn new(delay: Duration, max_wait: Option<Duration>) -> Self {
        Self {
            delay,
            max_wait,
            dirty: false,
            armed_at: None,
            deadline: None,
        }
    }

    /// Record that a placement pass is wanted.
    pub fn mark(&mut self) {
        self.dirty = true;
    }

    /// True when a pass is requested or pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.dirty || self.armed_at.is_some()
    }

    /// Advance the clock; returns true when the pending pass should fire.
    ///
    /// A mark observed here (re)starts the delay; the deadline is pinned
    /// by the first mark of the burst so restarts cannot starve it.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.dirty {
            self.dirty = false;
            self.armed_at = Some(now);
            if self.deadline.is_none() {
                self.deadline = self.max_wait.map(|wait| now + wait);
            }
        }
        let Some(armed_at) = self.armed_at else {
            return false;
        };
        let deadline_hit = self.deadline.is_some_and(|deadline| now >= deadline);
        if now >= armed_at + self.delay || deadline_hit {
            self.clear();
            return true;
        }
        false
    }

    /// Drop any pending pass.
    pub fn clear(&mut self) {
        self.dirty = false;
        self.armed_at = None;
        self.deadline = None;
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        // ~One frame of debounce, bounded to stay responsive under bursts.
        Self::new(Duration::from_millis(16), Some(Duration::from_millis(100)))
    }
}
