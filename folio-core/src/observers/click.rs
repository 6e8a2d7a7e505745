//! Click handlers: in-page navigation, the contact button, and outbound links.
//!
//! Handlers read the clicked element through [`LinkElement`], whose reads may
//! fail the way DOM property access can. A failed read is logged and the click
//! is ignored; it never reaches the caller.

use serde::Deserialize;

use crate::dispatch::{AnalyticsHost, DispatchOutcome, Dispatcher};
use crate::error::Result;
use crate::sanitize::sanitize;
use crate::types::Event;

/// Read access to a clicked anchor.
pub trait LinkElement {
    /// The raw `href` attribute.
    fn href(&self) -> Result<Option<String>>;

    /// Hostname of the resolved link target.
    fn hostname(&self) -> Result<Option<String>>;

    /// Visible text content.
    fn text(&self) -> Result<Option<String>>;
}

/// A link captured as plain data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StaticLink {
    #[serde(default)]
    pub href: Option<String>,
    /// Resolved hostname; derived from an absolute `href` when absent
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl StaticLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl LinkElement for StaticLink {
    fn href(&self) -> Result<Option<String>> {
        Ok(self.href.clone())
    }

    fn hostname(&self) -> Result<Option<String>> {
        Ok(self
            .hostname
            .clone()
            .or_else(|| self.href.as_deref().and_then(host_of).map(str::to_string)))
    }

    fn text(&self) -> Result<Option<String>> {
        Ok(self.text.clone())
    }
}

/// Hostname of an absolute URL, without userinfo or port.
fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = match host.strip_prefix('[') {
        Some(v6) => v6.split(']').next()?,
        None => host.split(':').next()?,
    };
    (!host.is_empty()).then_some(host)
}

/// Handle a click on an in-page navigation link.
///
/// Links without a target (`href` missing, empty, or a bare `#`) are ignored.
pub fn on_navigation_click<H: AnalyticsHost>(
    link: &dyn LinkElement,
    dispatcher: &mut Dispatcher<H>,
) -> Option<DispatchOutcome> {
    match navigation_event(link) {
        Ok(event) => event.map(|e| dispatcher.dispatch(e)),
        Err(e) => {
            tracing::error!(error = %e, "Analytics navigation tracking error");
            None
        }
    }
}

fn navigation_event(link: &dyn LinkElement) -> Result<Option<Event>> {
    let href = match link.href()? {
        Some(href) if !href.is_empty() && href != "#" => href,
        _ => return Ok(None),
    };
    let target = href.strip_prefix('#').unwrap_or(&href);
    let section = sanitize(Some(target));
    if section.is_empty() {
        return Ok(None);
    }
    Ok(Some(Event::navigation_click(&section)))
}

/// Handle a click on the hero contact button.
pub fn on_contact_click<H: AnalyticsHost>(dispatcher: &mut Dispatcher<H>) -> DispatchOutcome {
    dispatcher.dispatch(Event::contact_initiated())
}

/// Handle a click on a link that may leave the site.
///
/// Links whose host equals `page_host` are internal and ignored.
pub fn on_outbound_click<H: AnalyticsHost>(
    link: &dyn LinkElement,
    page_host: &str,
    dispatcher: &mut Dispatcher<H>,
) -> Option<DispatchOutcome> {
    match outbound_event(link, page_host) {
        Ok(event) => event.map(|e| dispatcher.dispatch(e)),
        Err(e) => {
            tracing::error!(error = %e, "Analytics outbound tracking error");
            None
        }
    }
}

fn outbound_event(link: &dyn LinkElement, page_host: &str) -> Result<Option<Event>> {
    let host = match link.hostname()? {
        Some(host) if !host.is_empty() => host,
        _ => return Ok(None),
    };
    if host.eq_ignore_ascii_case(page_host) {
        return Ok(None);
    }
    let url = link.href()?.unwrap_or_default();
    let text = sanitize(link.text()?.as_deref().map(str::trim));
    Ok(Some(Event::outbound_click(&host, &text, &url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ScriptedHost;
    use crate::error::Error;

    struct BrokenLink;

    impl LinkElement for BrokenLink {
        fn href(&self) -> Result<Option<String>> {
            Err(Error::Dom("getAttribute is not a function".to_string()))
        }

        fn hostname(&self) -> Result<Option<String>> {
            Err(Error::Dom("hostname unavailable".to_string()))
        }

        fn text(&self) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_navigation_click_tracked() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        let outcome = on_navigation_click(&StaticLink::new("#about"), &mut dispatcher);

        assert_eq!(outcome, Some(DispatchOutcome::Delivered));
        let call = &dispatcher.host().calls()[0];
        assert_eq!(call.name, "navigation_click");
        assert_eq!(call.parameters["event_category"], "navigation");
        assert_eq!(call.parameters["event_label"], "about");
        assert_eq!(call.parameters["navigation_type"], "menu");
    }

    #[test]
    fn test_navigation_without_target_is_ignored() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());

        for link in [StaticLink::new("#"), StaticLink::new(""), StaticLink::default()] {
            assert_eq!(on_navigation_click(&link, &mut dispatcher), None);
        }
        assert!(dispatcher.host().calls().is_empty());
        assert!(dispatcher.pending().is_empty());
    }

    #[test]
    fn test_navigation_label_is_sanitized() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        on_navigation_click(&StaticLink::new("#\"work\""), &mut dispatcher);
        assert_eq!(dispatcher.host().calls()[0].parameters["event_label"], "work");

        // nothing left after sanitizing
        assert_eq!(
            on_navigation_click(&StaticLink::new("#<>"), &mut dispatcher),
            None
        );
    }

    #[test]
    fn test_navigation_read_error_is_contained() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        assert_eq!(on_navigation_click(&BrokenLink, &mut dispatcher), None);
        assert!(dispatcher.host().calls().is_empty());
    }

    #[test]
    fn test_contact_click() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::unavailable());
        assert_eq!(on_contact_click(&mut dispatcher), DispatchOutcome::Queued);
        assert_eq!(
            dispatcher.pending().entries()[0]["event_label"],
            "hero_contact_button"
        );
    }

    #[test]
    fn test_internal_link_is_ignored() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        let link = StaticLink::new("https://heliomedeiros.com/blog").with_text("Blog");

        assert_eq!(
            on_outbound_click(&link, "heliomedeiros.com", &mut dispatcher),
            None
        );
        assert!(dispatcher.host().calls().is_empty());
    }

    #[test]
    fn test_outbound_link_tracked_once() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        let link = StaticLink::new("https://github.com/heliomedeiros").with_text(" <GitHub> ");

        let outcome = on_outbound_click(&link, "heliomedeiros.com", &mut dispatcher);

        assert_eq!(outcome, Some(DispatchOutcome::Delivered));
        let calls = dispatcher.host().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "outbound_click");
        assert_eq!(calls[0].parameters["event_label"], "github.com");
        assert_eq!(calls[0].parameters["link_text"], "GitHub");
        assert_eq!(
            calls[0].parameters["link_url"],
            "https://github.com/heliomedeiros"
        );
    }

    #[test]
    fn test_outbound_read_error_is_contained() {
        let mut dispatcher = Dispatcher::new(ScriptedHost::available());
        assert_eq!(
            on_outbound_click(&BrokenLink, "heliomedeiros.com", &mut dispatcher),
            None
        );
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://github.com/x"), Some("github.com"));
        assert_eq!(host_of("http://user@example.org:8080/a?b"), Some("example.org"));
        assert_eq!(host_of("https://[::1]:443/"), Some("::1"));
        assert_eq!(host_of("https://linkedin.com#frag"), Some("linkedin.com"));
        assert_eq!(host_of("/relative/path"), None);
        assert_eq!(host_of("mailto:me@example.com"), None);
    }

    #[test]
    fn test_explicit_hostname_wins() {
        let link = StaticLink {
            href: Some("/docs".to_string()),
            hostname: Some("heliomedeiros.com".to_string()),
            text: None,
        };
        assert_eq!(link.hostname().unwrap().as_deref(), Some("heliomedeiros.com"));
    }
}
