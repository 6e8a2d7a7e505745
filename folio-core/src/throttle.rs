//! Trailing-edge throttle driven by host timestamps.
//!
//! The page calls [`Throttle::call`] on every raw scroll event and schedules a
//! timer for [`Throttle::deadline`]. When the timer fires it calls
//! [`Throttle::poll`], which yields the most recent arguments once the quiet
//! period has elapsed. Every call pushes the deadline back, so a continuous
//! burst collapses into a single evaluation after it ends.
//!
//! Timestamps are milliseconds from any fixed origin (`performance.now()` in
//! the browser).

use std::time::Duration;

/// Collapses bursts of calls into one trailing evaluation.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    wait_ms: u64,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    args: T,
    deadline_ms: u64,
}

impl<T> Throttle<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            pending: None,
        }
    }

    /// Record a call. Replaces any earlier pending arguments and restarts the
    /// quiet period.
    pub fn call(&mut self, args: T, now_ms: u64) {
        self.pending = Some(Pending {
            args,
            deadline_ms: now_ms.saturating_add(self.wait_ms),
        });
    }

    /// Take the pending arguments if the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        match &self.pending {
            Some(p) if now_ms >= p.deadline_ms => self.pending.take().map(|p| p.args),
            _ => None,
        }
    }

    /// When the pending evaluation becomes due, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}
