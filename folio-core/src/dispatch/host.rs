//! The external analytics entry point, as seen from Rust.

use serde_json::Value;

use crate::error::Result;
use crate::types::Parameters;

/// Capability interface over the page's analytics entry point (`gtag`).
///
/// Implementations are untrusted: the entry point may be missing, or present
/// and failing. In the browser this is backed by `window.gtag`; natively it is
/// a [`ScriptedHost`](super::ScriptedHost).
pub trait AnalyticsHost {
    /// Whether the entry point exists and is callable right now.
    fn is_available(&self) -> bool;

    /// Invoke the entry point with `(command, name, parameters)`.
    ///
    /// An `Err` means the entry point itself raised.
    fn call(&mut self, command: &str, name: &str, parameters: &Parameters) -> Result<()>;

    /// Whether the library has finished loading (its queue holds the
    /// `gtm.load` marker).
    fn has_loaded_marker(&self) -> bool {
        false
    }

    /// Mirror a queued entry into the page's own event queue, where the
    /// library picks it up once it loads. Must not fail.
    fn enqueue(&mut self, _entry: &Value) {}
}

impl<H: AnalyticsHost + ?Sized> AnalyticsHost for Box<H> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn call(&mut self, command: &str, name: &str, parameters: &Parameters) -> Result<()> {
        (**self).call(command, name, parameters)
    }

    fn has_loaded_marker(&self) -> bool {
        (**self).has_loaded_marker()
    }

    fn enqueue(&mut self, entry: &Value) {
        (**self).enqueue(entry)
    }
}
