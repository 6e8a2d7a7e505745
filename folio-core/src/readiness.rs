//! Waiting for the analytics library to finish loading.
//!
//! The library counts as ready once its entry point is callable and its queue
//! holds the `gtm.load` marker. The page polls the gate on a fixed interval;
//! past the timeout the gate gives up once, with a warning. Giving up only
//! stops the wait: events keep flowing to the pending queue.

use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::dispatch::AnalyticsHost;

/// State of the wait for the analytics library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Waiting,
    Ready,
    GaveUp,
}

/// Single deferred check with a timeout.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    started_ms: u64,
    timeout_ms: u64,
    poll_ms: u64,
    state: Readiness,
}

impl ReadinessGate {
    pub fn new(started_ms: u64, timeout_ms: u64, poll_ms: u64) -> Self {
        Self {
            started_ms,
            timeout_ms,
            poll_ms,
            state: Readiness::Waiting,
        }
    }

    pub fn from_config(config: &AnalyticsConfig, started_ms: u64) -> Self {
        Self::new(started_ms, config.ready_timeout_ms, config.ready_poll_ms)
    }

    /// Check the host. Terminal states are sticky and only logged once.
    pub fn poll(&mut self, host: &dyn AnalyticsHost, now_ms: u64) -> Readiness {
        if self.state != Readiness::Waiting {
            return self.state;
        }

        if host.is_available() && host.has_loaded_marker() {
            tracing::info!(
                waited_ms = now_ms.saturating_sub(self.started_ms),
                "Google Analytics fully loaded, initializing"
            );
            self.state = Readiness::Ready;
        } else if now_ms.saturating_sub(self.started_ms) >= self.timeout_ms {
            tracing::warn!(
                timeout_ms = self.timeout_ms,
                "Timeout waiting for Google Analytics, skipping"
            );
            self.state = Readiness::GaveUp;
        }

        self.state
    }

    /// When the next check is due while still waiting.
    pub fn next_poll_at(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            Readiness::Waiting => Some(now_ms.saturating_add(self.poll_ms)),
            _ => None,
        }
    }

    pub fn state(&self) -> Readiness {
        self.state
    }
}
