//! Email reveal detection.
//!
//! The contact section reveals the email address by inserting a `mailto:`
//! anchor into a container. The host observes child-list mutations on that
//! container and forwards them here.

use serde::Deserialize;

use crate::dispatch::{AnalyticsHost, DispatchOutcome, Dispatcher};
use crate::types::Event;

/// `MutationRecord.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// A node inserted by a mutation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddedNode {
    /// `node.tagName`; absent for text nodes
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Resolved `node.href` for anchors
    #[serde(default)]
    pub href: Option<String>,
}

impl AddedNode {
    pub fn anchor(href: impl Into<String>) -> Self {
        Self {
            tag_name: Some("A".to_string()),
            href: Some(href.into()),
        }
    }

    fn is_mailto_anchor(&self) -> bool {
        let is_anchor = self
            .tag_name
            .as_deref()
            .is_some_and(|tag| tag.eq_ignore_ascii_case("a"));
        is_anchor
            && self
                .href
                .as_deref()
                .is_some_and(|href| href.starts_with("mailto:"))
    }
}

/// One mutation record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MutationRecord {
    #[serde(rename = "type")]
    pub kind: MutationKind,
    #[serde(default)]
    pub added_nodes: Vec<AddedNode>,
}

/// Dispatch `email_revealed` for every child-list mutation that inserted a
/// `mailto:` anchor. Other mutations and nodes are ignored.
pub fn observe_mutations<H: AnalyticsHost>(
    records: &[MutationRecord],
    dispatcher: &mut Dispatcher<H>,
) -> Vec<DispatchOutcome> {
    records
        .iter()
        .filter(|record| record.kind == MutationKind::ChildList)
        .filter(|record| record.added_nodes.iter().any(AddedNode::is_mailto_anchor))
        .map(|_| dispatcher.dispatch(Event::email_revealed()))
        .collect()
}
