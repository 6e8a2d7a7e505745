//! Page-level tracking state.
//!
//! A [`Tracker`] is created once per page. It owns the dispatcher (and with it
//! the pending queue), the scroll milestones already fired, the scroll
//! throttle and the readiness gate. Once the gate settles, the host wires each
//! [`Subscription`](crate::observers::Subscription) to the matching `on_*`
//! handler; all handlers run on the page's single event loop.

use std::time::Duration;

use crate::config::Config;
use crate::dispatch::{AnalyticsHost, DispatchOutcome, Dispatcher};
use crate::observers::{
    self, click, email, section, IntersectionEntry, LinkElement, MutationRecord,
    ScrollDepthObserver, ScrollSample, Subscription,
};
use crate::readiness::{Readiness, ReadinessGate};
use crate::throttle::Throttle;

/// Tracking state for one page session.
pub struct Tracker<H> {
    dispatcher: Dispatcher<H>,
    scroll: ScrollDepthObserver,
    throttle: Throttle<ScrollSample>,
    gate: ReadinessGate,
    page_host: String,
    subscriptions: Vec<Subscription>,
}

impl<H: AnalyticsHost> Tracker<H> {
    /// Set up tracking for a page that started loading at `now_ms`.
    pub fn new(host: H, config: &Config, now_ms: u64) -> Self {
        let analytics = &config.analytics;
        Self {
            dispatcher: Dispatcher::new(host),
            scroll: ScrollDepthObserver::new(analytics.milestones.clone()),
            throttle: Throttle::new(Duration::from_millis(analytics.scroll_throttle_ms)),
            gate: ReadinessGate::from_config(analytics, now_ms),
            page_host: config.site.hostname.clone(),
            subscriptions: observers::subscriptions(analytics),
        }
    }

    /// Notification sources the host must register.
    ///
    /// Empty while the readiness gate is still waiting. After the library
    /// loads, or after the gate gives up, the full list is returned; in the
    /// latter case events keep going to the pending queue.
    pub fn subscriptions(&self) -> &[Subscription] {
        match self.gate.state() {
            Readiness::Waiting => &[],
            Readiness::Ready | Readiness::GaveUp => &self.subscriptions,
        }
    }

    /// Check whether the analytics library has finished loading.
    pub fn poll_readiness(&mut self, now_ms: u64) -> Readiness {
        self.gate.poll(self.dispatcher.host(), now_ms)
    }

    /// When the host should next call [`poll_readiness`](Self::poll_readiness).
    pub fn next_readiness_poll(&self, now_ms: u64) -> Option<u64> {
        self.gate.next_poll_at(now_ms)
    }

    /// Raw scroll event. Returns when the throttled evaluation becomes due;
    /// the host calls [`on_timer`](Self::on_timer) at that time.
    pub fn on_scroll(&mut self, sample: ScrollSample, now_ms: u64) -> Option<u64> {
        self.throttle.call(sample, now_ms);
        self.throttle.deadline()
    }

    /// Timer callback: evaluate the latest scroll sample if its quiet period
    /// has elapsed.
    pub fn on_timer(&mut self, now_ms: u64) -> Vec<DispatchOutcome> {
        match self.throttle.poll(now_ms) {
            Some(sample) => self.scroll.observe(sample, &mut self.dispatcher),
            None => Vec::new(),
        }
    }

    /// Pending scroll evaluation deadline, if any.
    pub fn scroll_deadline(&self) -> Option<u64> {
        self.throttle.deadline()
    }

    pub fn on_sections(&mut self, entries: &[IntersectionEntry]) -> Vec<DispatchOutcome> {
        section::observe_sections(entries, &mut self.dispatcher)
    }

    pub fn on_navigation_click(&mut self, link: &dyn LinkElement) -> Option<DispatchOutcome> {
        click::on_navigation_click(link, &mut self.dispatcher)
    }

    pub fn on_contact_click(&mut self) -> DispatchOutcome {
        click::on_contact_click(&mut self.dispatcher)
    }

    pub fn on_outbound_click(&mut self, link: &dyn LinkElement) -> Option<DispatchOutcome> {
        click::on_outbound_click(link, &self.page_host, &mut self.dispatcher)
    }

    pub fn on_mutations(&mut self, records: &[MutationRecord]) -> Vec<DispatchOutcome> {
        email::observe_mutations(records, &mut self.dispatcher)
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<H> {
        &mut self.dispatcher
    }

    pub fn scroll_observer(&self) -> &ScrollDepthObserver {
        &self.scroll
    }

    pub fn readiness(&self) -> Readiness {
        self.gate.state()
    }

    pub fn into_dispatcher(self) -> Dispatcher<H> {
        self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ScriptedHost;
    use crate::observers::StaticLink;

    fn sample(scroll_top: f64) -> ScrollSample {
        ScrollSample {
            scroll_top,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        }
    }

    #[test]
    fn test_scroll_goes_through_throttle() {
        let mut tracker = Tracker::new(ScriptedHost::available(), &Config::default(), 0);

        assert_eq!(tracker.on_scroll(sample(100.0), 0), Some(100));
        assert_eq!(tracker.on_scroll(sample(300.0), 50), Some(150));
        assert!(tracker.on_timer(100).is_empty());

        let outcomes = tracker.on_timer(150);
        assert_eq!(outcomes, vec![DispatchOutcome::Delivered]);
        assert!(tracker.scroll_observer().tracked().contains(&25));
        assert_eq!(tracker.scroll_deadline(), None);
    }

    #[test]
    fn test_outbound_uses_configured_host() {
        let mut config = Config::default();
        config.site.hostname = "example.org".to_string();
        let mut tracker = Tracker::new(ScriptedHost::available(), &config, 0);

        assert_eq!(
            tracker.on_outbound_click(&StaticLink::new("https://example.org/about")),
            None
        );
        assert_eq!(
            tracker.on_outbound_click(&StaticLink::new("https://heliomedeiros.com/")),
            Some(DispatchOutcome::Delivered)
        );
    }

    #[test]
    fn test_readiness_follows_host() {
        let mut host = ScriptedHost::unavailable();
        host.set_loaded(true);
        let mut tracker = Tracker::new(host, &Config::default(), 0);

        assert_eq!(tracker.poll_readiness(100), Readiness::Waiting);
        assert_eq!(tracker.next_readiness_poll(100), Some(200));

        tracker.dispatcher_mut().host_mut().set_available(true);
        assert_eq!(tracker.poll_readiness(200), Readiness::Ready);
        assert_eq!(tracker.readiness(), Readiness::Ready);
    }

    #[test]
    fn test_subscriptions_match_config() {
        let mut tracker = Tracker::new(ScriptedHost::available(), &Config::default(), 0);
        assert_eq!(tracker.poll_readiness(0), Readiness::Ready);
        assert_eq!(
            tracker.subscriptions(),
            observers::subscriptions(&Config::default().analytics).as_slice()
        );
    }

    #[test]
    fn test_subscriptions_wait_for_readiness() {
        let mut tracker = Tracker::new(ScriptedHost::unavailable(), &Config::default(), 0);

        assert_eq!(tracker.poll_readiness(5_000), Readiness::Waiting);
        assert!(tracker.subscriptions().is_empty());

        // giving up still wires the observers; events then queue
        assert_eq!(tracker.poll_readiness(10_000), Readiness::GaveUp);
        assert_eq!(tracker.subscriptions().len(), 6);
        assert_eq!(tracker.on_contact_click(), DispatchOutcome::Queued);
    }
}
