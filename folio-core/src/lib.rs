//! # folio-core
//!
//! Core library for folio - analytics tracking and response hardening for a
//! static portfolio site.
//!
//! This library provides:
//! - A guarded event dispatcher that delivers, queues or drops analytics events
//! - Interaction observers for scroll depth, section views, clicks and email reveals
//! - Response security headers and the content security policy
//! - The production `gtag.js` bootstrap
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Events flow in one direction:
//! - **Observers** turn page notifications into sanitized [`Event`]s
//! - The **[`Dispatcher`](dispatch::Dispatcher)** checks the analytics entry
//!   point and delivers, queues or drops each event
//! - The **host** ([`AnalyticsHost`](dispatch::AnalyticsHost)) is the page's
//!   `gtag` in the browser, or a [`ScriptedHost`](dispatch::ScriptedHost) natively
//!
//! ## Example
//!
//! ```rust
//! use folio_core::dispatch::ScriptedHost;
//! use folio_core::observers::StaticLink;
//! use folio_core::{Config, Tracker};
//!
//! let config = Config::default();
//! let mut tracker = Tracker::new(ScriptedHost::unavailable(), &config, 0);
//!
//! tracker.on_navigation_click(&StaticLink::new("#about"));
//! assert_eq!(tracker.dispatcher().pending().len(), 1);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use readiness::Readiness;
pub use sanitize::sanitize;
pub use tracker::Tracker;
pub use types::*;

// Public modules
pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod observers;
pub mod readiness;
pub mod sanitize;
pub mod security;
pub mod throttle;
pub mod tracker;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
