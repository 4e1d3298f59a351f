//! One-shot deferred action handle
//!
//! The frame loop polls the timer with the current timestamp; nothing runs
//! on its own. Cancelling is synchronous, so a cancelled timer can never
//! fire against newer state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    deadline_ms: Option<f64>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay_ms` after `now_ms`, replacing any earlier deadline
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) {
        self.deadline_ms = Some(now_ms + delay_ms.max(0.0));
    }

    /// Disarm; idempotent
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline_ms
    }

    /// Returns true exactly once when the deadline has passed, then disarms
    pub fn fire_due(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
