//! Session replay.
//!
//! A session file records what a page saw: when `gtag` appeared, which events
//! it rejected, and a timeline of interactions. Replaying drives a [`Tracker`]
//! over a [`ScriptedHost`] and reports every dispatch outcome together with
//! what the host received and what was left queued.

use std::path::Path;

use anyhow::{Context, Result};
use folio_core::dispatch::{DispatchOutcome, DispatchStats, HostCall, ScriptedHost};
use folio_core::observers::{IntersectionEntry, MutationRecord, ScrollSample, StaticLink};
use folio_core::{Config, Readiness, Tracker};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recorded page session.
#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub interactions: Vec<TimedInteraction>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("failed to read session file")?;
        serde_json::from_str(&content).context("failed to parse session file")
    }
}

/// How the page's analytics entry point behaves.
#[derive(Debug, Default, Deserialize)]
pub struct PageSettings {
    /// Overrides `site.hostname`
    #[serde(default)]
    pub hostname: Option<String>,
    /// When `gtag` becomes available and loaded; never when absent
    #[serde(default)]
    pub available_from_ms: Option<u64>,
    /// Event names the entry point raises on
    #[serde(default)]
    pub failing_events: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimedInteraction {
    pub at_ms: u64,
    #[serde(flatten)]
    pub interaction: Interaction,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    Scroll {
        #[serde(flatten)]
        sample: ScrollSample,
    },
    /// Let time pass without input
    Tick,
    Sections {
        entries: Vec<IntersectionEntry>,
    },
    NavClick {
        #[serde(flatten)]
        link: StaticLink,
    },
    ContactClick,
    OutboundClick {
        #[serde(flatten)]
        link: StaticLink,
    },
    Mutations {
        records: Vec<MutationRecord>,
    },
}

impl Interaction {
    fn label(&self) -> &'static str {
        match self {
            Interaction::Scroll { .. } => "scroll",
            Interaction::Tick => "tick",
            Interaction::Sections { .. } => "sections",
            Interaction::NavClick { .. } => "nav_click",
            Interaction::ContactClick => "contact_click",
            Interaction::OutboundClick { .. } => "outbound_click",
            Interaction::Mutations { .. } => "mutations",
        }
    }
}

/// One point on the replay timeline that produced dispatches.
#[derive(Debug, Serialize)]
pub struct Step {
    pub at_ms: u64,
    pub action: &'static str,
    pub outcomes: Vec<DispatchOutcome>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub steps: Vec<Step>,
    pub calls: Vec<HostCall>,
    pub pending: Vec<Value>,
    pub stats: DispatchStats,
    pub readiness: Readiness,
}

/// Replay `session` against the given configuration.
///
/// Interactions are applied in time order. A throttled scroll evaluation that
/// falls due between two interactions runs at its deadline, and any left
/// pending at the end runs after the last interaction. Readiness is polled on
/// its own schedule from the page start, independent of the interactions.
pub fn run(config: &Config, session: &Session) -> Report {
    let mut config = config.clone();
    if let Some(hostname) = &session.page.hostname {
        config.site.hostname = hostname.clone();
    }

    let host = ScriptedHost::unavailable().failing_on(session.page.failing_events.iter().cloned());
    let mut replay = Replay {
        tracker: Tracker::new(host, &config, 0),
        page: &session.page,
        steps: Vec::new(),
        next_readiness_poll: Some(0),
    };

    let mut timeline: Vec<&TimedInteraction> = session.interactions.iter().collect();
    timeline.sort_by_key(|t| t.at_ms);

    for timed in timeline {
        replay.advance(timed.at_ms);

        let tracker = &mut replay.tracker;
        let outcomes = match &timed.interaction {
            Interaction::Scroll { sample } => {
                tracker.on_scroll(*sample, timed.at_ms);
                Vec::new()
            }
            Interaction::Tick => Vec::new(),
            Interaction::Sections { entries } => tracker.on_sections(entries),
            Interaction::NavClick { link } => {
                tracker.on_navigation_click(link).into_iter().collect()
            }
            Interaction::ContactClick => vec![tracker.on_contact_click()],
            Interaction::OutboundClick { link } => {
                tracker.on_outbound_click(link).into_iter().collect()
            }
            Interaction::Mutations { records } => tracker.on_mutations(records),
        };

        replay.record(timed.at_ms, timed.interaction.label(), outcomes);
    }

    if let Some(deadline) = replay.tracker.scroll_deadline() {
        replay.advance(deadline);
    }

    let Replay { tracker, steps, .. } = replay;
    let readiness = tracker.readiness();
    let dispatcher = tracker.into_dispatcher();
    let stats = dispatcher.stats().clone();
    let (host, queue) = dispatcher.into_parts();

    Report {
        steps,
        calls: host.calls().to_vec(),
        pending: queue.entries().to_vec(),
        stats,
        readiness,
    }
}

struct Replay<'a> {
    tracker: Tracker<ScriptedHost>,
    page: &'a PageSettings,
    steps: Vec<Step>,
    next_readiness_poll: Option<u64>,
}

impl Replay<'_> {
    /// Move the page clock to `now_ms`: run every readiness poll that fell
    /// due, then a scroll evaluation that fell due, then update the entry
    /// point's availability.
    fn advance(&mut self, now_ms: u64) {
        while let Some(at) = self.next_readiness_poll.filter(|at| *at <= now_ms) {
            self.set_availability(at);
            self.tracker.poll_readiness(at);
            self.next_readiness_poll = self.tracker.next_readiness_poll(at);
        }

        if let Some(deadline) = self.tracker.scroll_deadline().filter(|d| *d <= now_ms) {
            self.set_availability(deadline);
            let outcomes = self.tracker.on_timer(deadline);
            self.record(deadline, "scroll_evaluated", outcomes);
        }

        self.set_availability(now_ms);
    }

    fn set_availability(&mut self, now_ms: u64) {
        let available = self.page.available_from_ms.is_some_and(|from| from <= now_ms);
        let host = self.tracker.dispatcher_mut().host_mut();
        host.set_available(available);
        host.set_loaded(available);
    }

    fn record(&mut self, at_ms: u64, action: &'static str, outcomes: Vec<DispatchOutcome>) {
        if !outcomes.is_empty() {
            self.steps.push(Step {
                at_ms,
                action,
                outcomes,
            });
        }
    }
}

/// Print a replay report as text.
pub fn print_report(source: &str, report: &Report) {
    println!("Replay of {source}");
    println!();

    if report.steps.is_empty() {
        println!("No events were dispatched.");
    }
    for step in &report.steps {
        let outcomes: Vec<&str> = step.outcomes.iter().map(DispatchOutcome::as_str).collect();
        println!(
            "  {:>6}ms  {:<16} {}",
            step.at_ms,
            step.action,
            outcomes.join(", ")
        );
    }

    println!();
    println!("Host calls ({}):", report.calls.len());
    for call in &report.calls {
        println!(
            "  {} {} {}",
            call.command,
            call.name,
            Value::Object(call.parameters.clone())
        );
    }

    println!();
    println!("Pending queue ({}):", report.pending.len());
    for entry in &report.pending {
        println!("  {entry}");
    }

    println!();
    println!(
        "Delivered: {}  Queued: {}  Dropped: {}",
        report.stats.delivered, report.stats.queued, report.stats.dropped
    );
    let readiness = match report.readiness {
        Readiness::Waiting => "waiting",
        Readiness::Ready => "ready",
        Readiness::GaveUp => "gave up",
    };
    println!("Readiness: {readiness}");
}
