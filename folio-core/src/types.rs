//! Core domain types for folio
//!
//! An [`Event`] is built by an observer at the moment of a trigger and handed
//! to the [`Dispatcher`](crate::dispatch::Dispatcher), which consumes it once.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Event parameters: string keys mapped to primitives or nested objects.
pub type Parameters = Map<String, Value>;

/// Command passed to the analytics entry point for every tracked event.
pub const EVENT_COMMAND: &str = "event";

/// Names of the events folio emits.
pub mod names {
    pub const SCROLL_DEPTH: &str = "scroll_depth";
    pub const SECTION_VIEW: &str = "section_view";
    pub const NAVIGATION_CLICK: &str = "navigation_click";
    pub const CONTACT_INITIATED: &str = "contact_initiated";
    pub const EMAIL_REVEALED: &str = "email_revealed";
    pub const OUTBOUND_CLICK: &str = "outbound_click";
}

/// A single tracked interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    name: String,
    parameters: Parameters,
}

impl Event {
    /// Create an event from a name and a parameter map.
    pub fn new(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Create an event from a JSON object literal.
    ///
    /// Non-object values produce an event with no parameters.
    pub fn from_json(name: impl Into<String>, parameters: Value) -> Self {
        let parameters = match parameters {
            Value::Object(map) => map,
            _ => Parameters::new(),
        };
        Self::new(name, parameters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Shape appended to the pending queue: `{"event": name, ...parameters}`.
    ///
    /// Parameter keys are written after `event`, so a parameter named `event`
    /// replaces the name, as object spread would.
    pub fn queue_entry(&self) -> Value {
        let mut entry = Map::with_capacity(self.parameters.len() + 1);
        entry.insert("event".to_string(), Value::String(self.name.clone()));
        for (key, value) in &self.parameters {
            entry.insert(key.clone(), value.clone());
        }
        Value::Object(entry)
    }

    // Fixed-shape constructors, one per observer.

    /// `scroll_depth` for a reached milestone.
    pub fn scroll_depth(milestone: u8) -> Self {
        Self::from_json(
            names::SCROLL_DEPTH,
            json!({
                "event_category": "engagement",
                "event_label": format!("{milestone}_percent"),
                "value": milestone,
            }),
        )
    }

    /// `section_view` for an already sanitized section id.
    pub fn section_view(section: &str) -> Self {
        Self::from_json(
            names::SECTION_VIEW,
            json!({
                "event_category": "navigation",
                "event_label": section,
                "custom_map": { "section_name": section },
            }),
        )
    }

    /// `navigation_click` for an already sanitized section id.
    pub fn navigation_click(section: &str) -> Self {
        Self::from_json(
            names::NAVIGATION_CLICK,
            json!({
                "event_category": "navigation",
                "event_label": section,
                "navigation_type": "menu",
            }),
        )
    }

    pub fn contact_initiated() -> Self {
        Self::from_json(
            names::CONTACT_INITIATED,
            json!({
                "event_category": "conversion",
                "event_label": "hero_contact_button",
                "value": 1,
            }),
        )
    }

    pub fn email_revealed() -> Self {
        Self::from_json(
            names::EMAIL_REVEALED,
            json!({
                "event_category": "conversion",
                "event_label": "contact_email_reveal",
                "value": 2,
            }),
        )
    }

    /// `outbound_click` with the destination host, sanitized link text and URL.
    pub fn outbound_click(host: &str, text: &str, url: &str) -> Self {
        Self::from_json(
            names::OUTBOUND_CLICK,
            json!({
                "event_category": "outbound",
                "event_label": host,
                "link_text": text,
                "link_url": url,
            }),
        )
    }
}
