//! In-memory analytics host for replays and tests.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Parameters;

use super::host::AnalyticsHost;

/// A call received by a [`ScriptedHost`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostCall {
    pub command: String,
    pub name: String,
    pub parameters: Parameters,
}

/// Host whose availability and failures are set by the caller.
///
/// Every call that reaches the entry point is recorded, including calls that
/// then fail.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost {
    available: bool,
    loaded: bool,
    failing: HashSet<String>,
    calls: Vec<HostCall>,
    page_queue: Vec<Value>,
}

impl ScriptedHost {
    /// A host whose entry point is present and fully loaded.
    pub fn available() -> Self {
        Self {
            available: true,
            loaded: true,
            ..Default::default()
        }
    }

    /// A host with no entry point.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Make the entry point raise for the given event names.
    pub fn failing_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Entries mirrored into the page queue while the entry point was missing.
    pub fn page_queue(&self) -> &[Value] {
        &self.page_queue
    }
}

impl AnalyticsHost for ScriptedHost {
    fn is_available(&self) -> bool {
        self.available
    }

    fn call(&mut self, command: &str, name: &str, parameters: &Parameters) -> Result<()> {
        self.calls.push(HostCall {
            command: command.to_string(),
            name: name.to_string(),
            parameters: parameters.clone(),
        });
        if self.failing.contains(name) {
            return Err(Error::Host(format!("gtag error while sending {name}")));
        }
        Ok(())
    }

    fn has_loaded_marker(&self) -> bool {
        self.available && self.loaded
    }

    fn enqueue(&mut self, entry: &Value) {
        self.page_queue.push(entry.clone());
    }
}
