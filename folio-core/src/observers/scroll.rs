//! Scroll depth milestones.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::dispatch::{AnalyticsHost, DispatchOutcome, Dispatcher};
use crate::types::Event;

/// Page geometry at the moment of a scroll sample, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScrollSample {
    /// `window.pageYOffset`
    pub scroll_top: f64,
    /// `document.documentElement.scrollHeight`
    pub scroll_height: f64,
    /// `window.innerHeight`
    pub viewport_height: f64,
}

impl ScrollSample {
    /// Scrolled percentage, rounded half up.
    ///
    /// `None` when the page is not taller than the viewport.
    pub fn percent(&self) -> Option<i64> {
        if self.scroll_height.is_nan() || self.scroll_height <= self.viewport_height {
            return None;
        }
        let scrollable = self.scroll_height - self.viewport_height;
        let percent = (self.scroll_top / scrollable * 100.0 + 0.5).floor();
        percent.is_finite().then_some(percent as i64)
    }
}

/// Fires each milestone at most once per page session.
#[derive(Debug, Clone)]
pub struct ScrollDepthObserver {
    milestones: Vec<u8>,
    tracked: BTreeSet<u8>,
}

impl ScrollDepthObserver {
    /// `milestones` must be ascending; see
    /// [`AnalyticsConfig::validate`](crate::config::AnalyticsConfig::validate).
    pub fn new(milestones: Vec<u8>) -> Self {
        Self {
            milestones,
            tracked: BTreeSet::new(),
        }
    }

    /// Evaluate one sample, dispatching every newly reached milestone.
    pub fn observe<H: AnalyticsHost>(
        &mut self,
        sample: ScrollSample,
        dispatcher: &mut Dispatcher<H>,
    ) -> Vec<DispatchOutcome> {
        let Some(percent) = sample.percent() else {
            return Vec::new();
        };

        let mut outcomes = Vec::new();
        for &milestone in &self.milestones {
            if percent >= i64::from(milestone) && self.tracked.insert(milestone) {
                outcomes.push(dispatcher.dispatch(Event::scroll_depth(milestone)));
            }
        }
        outcomes
    }

    /// Milestones already fired.
    pub fn tracked(&self) -> &BTreeSet<u8> {
        &self.tracked
    }
}
