//! The dispatcher and its pending queue.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::types::{Event, EVENT_COMMAND};

use super::host::AnalyticsHost;

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The entry point accepted the event
    Delivered,
    /// The entry point was unavailable; the event was queued
    Queued,
    /// The entry point raised; the event was logged and dropped
    Dropped,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Delivered => "delivered",
            DispatchOutcome::Queued => "queued",
            DispatchOutcome::Dropped => "dropped",
        }
    }
}

/// Dispatch counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub delivered: usize,
    pub queued: usize,
    pub dropped: usize,
}

/// Append-only queue of events waiting for the analytics library.
///
/// Created on the first event that finds the entry point unavailable. Nothing
/// in this crate drains it; the analytics library reads it once it loads.
#[derive(Debug, Default, Clone)]
pub struct PendingQueue {
    entries: Option<Vec<Value>>,
}

impl PendingQueue {
    fn push(&mut self, entry: Value) {
        self.entries.get_or_insert_with(Vec::new).push(entry);
    }

    /// Whether any event has ever been queued.
    pub fn is_created(&self) -> bool {
        self.entries.is_some()
    }

    pub fn entries(&self) -> &[Value] {
        self.entries.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Delivers events to an [`AnalyticsHost`], queueing or dropping as needed.
///
/// `dispatch` never returns an error and never panics, whatever the host does.
pub struct Dispatcher<H> {
    host: H,
    queue: PendingQueue,
    stats: DispatchStats,
}

impl<H: AnalyticsHost> Dispatcher<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            queue: PendingQueue::default(),
            stats: DispatchStats::default(),
        }
    }

    /// Dispatch one event. Consumes it; nothing is retried.
    pub fn dispatch(&mut self, event: Event) -> DispatchOutcome {
        if !self.host.is_available() {
            let entry = event.queue_entry();
            self.host.enqueue(&entry);
            self.queue.push(entry);
            self.stats.queued += 1;
            tracing::warn!(
                event = event.name(),
                queued = self.queue.len(),
                "gtag not available, queueing event"
            );
            return DispatchOutcome::Queued;
        }

        let host = &mut self.host;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            host.call(EVENT_COMMAND, event.name(), event.parameters())
        }))
        .unwrap_or_else(|payload| Err(Error::Host(panic_message(payload.as_ref()))));

        match result {
            Ok(()) => {
                self.stats.delivered += 1;
                tracing::info!(event = event.name(), "Event tracked");
                DispatchOutcome::Delivered
            }
            Err(e) => {
                self.stats.dropped += 1;
                tracing::error!(event = event.name(), error = %e, "Error tracking event");
                DispatchOutcome::Dropped
            }
        }
    }

    /// Events waiting for the analytics library, oldest first.
    pub fn pending(&self) -> &PendingQueue {
        &self.queue
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_parts(self) -> (H, PendingQueue) {
        (self.host, self.queue)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("entry point panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("entry point panicked: {s}")
    } else {
        "entry point panicked".to_string()
    }
}
