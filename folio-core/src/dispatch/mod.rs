//! Guarded analytics event dispatch
//!
//! The analytics library is loaded asynchronously by the page and may arrive
//! late, never arrive, or arrive broken. The dispatcher decides, per event:
//!
//! - **Delivered:** the entry point is callable and accepted the event
//! - **Queued:** the entry point is missing; the event is appended to the
//!   pending queue for the library to pick up once it initializes
//! - **Dropped:** the entry point raised; the error is logged and the event is
//!   not retried, since a failed call may already have had side effects
//!
//! Availability is checked on every call and never cached.
//!
//! ## Usage
//!
//! ```rust
//! use folio_core::dispatch::{Dispatcher, DispatchOutcome, ScriptedHost};
//! use folio_core::Event;
//!
//! let mut dispatcher = Dispatcher::new(ScriptedHost::unavailable());
//! let outcome = dispatcher.dispatch(Event::contact_initiated());
//! assert_eq!(outcome, DispatchOutcome::Queued);
//! assert_eq!(dispatcher.pending().len(), 1);
//! ```

mod dispatcher;
mod host;
mod scripted;

pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher, PendingQueue};
pub use host::AnalyticsHost;
pub use scripted::{HostCall, ScriptedHost};
