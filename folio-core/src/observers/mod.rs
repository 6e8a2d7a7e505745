//! Interaction observers
//!
//! Each observer turns one kind of page notification into at most a few
//! [`Event`](crate::Event)s and hands them to the
//! [`Dispatcher`](crate::dispatch::Dispatcher). Observers never see the DOM:
//! the host registers the [`Subscription`]s listed by
//! [`Tracker::subscriptions`](crate::Tracker::subscriptions) and forwards
//! each notification as plain data, or as an element behind a read trait when
//! reading it can fail.
//!
//! | Observer | Notification | Event |
//! |----------|--------------|-------|
//! | [`scroll`] | throttled scroll sample | `scroll_depth` |
//! | [`section`] | intersection entries | `section_view` |
//! | [`click`] | click on nav / contact / external link | `navigation_click`, `contact_initiated`, `outbound_click` |
//! | [`email`] | child-list mutations | `email_revealed` |

pub mod click;
pub mod email;
pub mod scroll;
pub mod section;

pub use click::{LinkElement, StaticLink};
pub use email::{AddedNode, MutationKind, MutationRecord};
pub use scroll::{ScrollDepthObserver, ScrollSample};
pub use section::{IntersectionEntry, SectionOptions};

use serde::Serialize;

use crate::config::AnalyticsConfig;

/// Selector for sections tracked by visibility.
pub const SECTION_SELECTOR: &str = "section[id]";
/// Selector for in-page navigation links.
pub const NAV_LINK_SELECTOR: &str = "nav a[href^=\"#\"]";
/// Selector for links that may leave the site.
pub const OUTBOUND_LINK_SELECTOR: &str = "a[href^=\"http\"]";
/// Id of the hero contact button.
pub const CONTACT_BUTTON_ID: &str = "contact-btn";
/// Id of the container the email address is revealed into.
pub const EMAIL_DISPLAY_ID: &str = "email-display";

/// Which click handler a click subscription feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    Navigation,
    Conversion,
    Outbound,
}

/// A notification source the host must wire to a tracker handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subscription {
    /// Window scroll events, forwarded to `on_scroll`
    Scroll { passive: bool, throttle_ms: u64 },
    /// Visibility of every element matching `selector`, forwarded to `on_sections`
    Intersection {
        selector: String,
        threshold: f64,
        root_margin: String,
    },
    /// Clicks on every element matching `selector`
    Click {
        selector: String,
        handler: ClickKind,
        passive: bool,
    },
    /// Child insertions under the element with `target_id`, forwarded to `on_mutations`
    ChildList { target_id: String },
}

/// Subscriptions for a page, in setup order.
pub fn subscriptions(config: &AnalyticsConfig) -> Vec<Subscription> {
    let sections = SectionOptions::from_config(config);
    vec![
        Subscription::Scroll {
            passive: true,
            throttle_ms: config.scroll_throttle_ms,
        },
        Subscription::Intersection {
            selector: SECTION_SELECTOR.to_string(),
            threshold: sections.threshold,
            root_margin: sections.root_margin,
        },
        Subscription::Click {
            selector: NAV_LINK_SELECTOR.to_string(),
            handler: ClickKind::Navigation,
            passive: true,
        },
        Subscription::Click {
            selector: format!("#{CONTACT_BUTTON_ID}"),
            handler: ClickKind::Conversion,
            passive: true,
        },
        Subscription::Click {
            selector: OUTBOUND_LINK_SELECTOR.to_string(),
            handler: ClickKind::Outbound,
            passive: true,
        },
        Subscription::ChildList {
            target_id: EMAIL_DISPLAY_ID.to_string(),
        },
    ]
}
