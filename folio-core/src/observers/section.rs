//! Section visibility.

use serde::Deserialize;

use crate::config::AnalyticsConfig;
use crate::dispatch::{AnalyticsHost, DispatchOutcome, Dispatcher};
use crate::sanitize::sanitize;
use crate::types::Event;

/// Options the host passes to its intersection observer.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOptions {
    pub threshold: f64,
    pub root_margin: String,
}

impl SectionOptions {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            threshold: config.section_threshold,
            root_margin: config.section_root_margin.clone(),
        }
    }
}

/// One entry of an intersection notification batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntersectionEntry {
    /// `entry.isIntersecting`
    pub is_intersecting: bool,
    /// `entry.target.id`
    #[serde(default)]
    pub target_id: Option<String>,
}

/// Dispatch `section_view` for every entry that became visible.
///
/// Entries are independent: each dispatch is isolated, and entries with an id
/// that sanitizes to nothing are skipped.
pub fn observe_sections<H: AnalyticsHost>(
    entries: &[IntersectionEntry],
    dispatcher: &mut Dispatcher<H>,
) -> Vec<DispatchOutcome> {
    entries
        .iter()
        .filter(|entry| entry.is_intersecting)
        .filter_map(|entry| {
            let section = sanitize(entry.target_id.as_deref());
            if section.is_empty() {
                return None;
            }
            tracing::debug!(section = %section, "Section view");
            Some(dispatcher.dispatch(Event::section_view(&section)))
        })
        .collect()
}
