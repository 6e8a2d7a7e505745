//! Integration tests for folio tracking
//!
//! These tests drive a `Tracker` over a scripted host the way a page would,
//! and check what reaches the analytics entry point and the pending queue.

use folio_core::dispatch::{DispatchOutcome, ScriptedHost};
use folio_core::observers::{
    AddedNode, IntersectionEntry, MutationKind, MutationRecord, ScrollSample, StaticLink,
    Subscription,
};
use folio_core::security::{meta_tags, ContentSecurityPolicy, SecurityHeaders};
use folio_core::{logging, sanitize, Config, Readiness, Tracker};
use http::HeaderMap;
use serde_json::json;
use tempfile::TempDir;

fn tracker(host: ScriptedHost) -> Tracker<ScriptedHost> {
    logging::init_test();
    Tracker::new(host, &Config::default(), 0)
}

fn sample(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> ScrollSample {
    ScrollSample {
        scroll_top,
        scroll_height,
        viewport_height,
    }
}

/// Feed one scroll sample and let its quiet period elapse.
fn scroll_and_settle(
    tracker: &mut Tracker<ScriptedHost>,
    sample: ScrollSample,
    now_ms: u64,
) -> Vec<DispatchOutcome> {
    let deadline = tracker
        .on_scroll(sample, now_ms)
        .expect("scroll should schedule an evaluation");
    tracker.on_timer(deadline)
}

// ============================================
// Dispatch Policy
// ============================================

#[test]
fn test_available_host_receives_each_event_once() {
    let mut tracker = tracker(ScriptedHost::available());

    tracker.on_contact_click();
    tracker.on_navigation_click(&StaticLink::new("#projects"));

    let calls = tracker.dispatcher().host().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.command == "event"));
    assert_eq!(calls[0].name, "contact_initiated");
    assert_eq!(calls[1].name, "navigation_click");
    assert_eq!(calls[1].parameters["event_label"], "projects");
    assert!(!tracker.dispatcher().pending().is_created());
}

#[test]
fn test_missing_host_queues_flattened_entries() {
    let mut tracker = tracker(ScriptedHost::unavailable());

    tracker.on_contact_click();
    tracker.on_sections(&[IntersectionEntry {
        is_intersecting: true,
        target_id: Some("about".to_string()),
    }]);

    let pending = tracker.dispatcher().pending().entries();
    assert_eq!(
        pending,
        &[
            json!({
                "event": "contact_initiated",
                "event_category": "conversion",
                "event_label": "hero_contact_button",
                "value": 1,
            }),
            json!({
                "event": "section_view",
                "event_category": "navigation",
                "event_label": "about",
                "custom_map": {"section_name": "about"},
            }),
        ]
    );
    assert!(tracker.dispatcher().host().calls().is_empty());
}

#[test]
fn test_failing_host_leaves_queue_unchanged() {
    let mut tracker = tracker(ScriptedHost::unavailable().failing_on(["outbound_click"]));

    tracker.on_contact_click();
    assert_eq!(tracker.dispatcher().pending().len(), 1);

    tracker.dispatcher_mut().host_mut().set_available(true);
    let outcome = tracker.on_outbound_click(&StaticLink::new("https://github.com/heliomedeiros"));

    assert_eq!(outcome, Some(DispatchOutcome::Dropped));
    assert_eq!(tracker.dispatcher().pending().len(), 1);
    assert_eq!(tracker.dispatcher().stats().dropped, 1);
}

// ============================================
// Observers
// ============================================

#[test]
fn test_sanitizer_examples() {
    assert_eq!(
        sanitize(Some(r#"<script>alert("xss")</script>"#)),
        "scriptalert(xss)/script"
    );
    assert_eq!(sanitize(None), "");
    assert_eq!(sanitize(Some(&"a".repeat(150))).chars().count(), 100);
}

#[test]
fn test_scroll_milestone_fires_once() {
    let mut tracker = tracker(ScriptedHost::available());

    // 500 of 1000 scrollable pixels
    let outcomes = scroll_and_settle(&mut tracker, sample(500.0, 2000.0, 1000.0), 0);
    assert_eq!(outcomes.len(), 2);

    // 250 of 1000 scrollable pixels, then deeper again
    assert!(scroll_and_settle(&mut tracker, sample(250.0, 2000.0, 1000.0), 500).is_empty());
    assert!(scroll_and_settle(&mut tracker, sample(510.0, 2000.0, 1000.0), 1000).is_empty());

    let labels: Vec<_> = tracker
        .dispatcher()
        .host()
        .calls()
        .iter()
        .map(|c| c.parameters["event_label"].clone())
        .collect();
    assert_eq!(labels, vec![json!("25_percent"), json!("50_percent")]);
}

#[test]
fn test_scroll_on_short_page_dispatches_nothing() {
    let mut tracker = tracker(ScriptedHost::available());

    assert!(scroll_and_settle(&mut tracker, sample(0.0, 800.0, 1000.0), 0).is_empty());
    assert!(scroll_and_settle(&mut tracker, sample(0.0, 1000.0, 1000.0), 500).is_empty());
    assert!(tracker.dispatcher().host().calls().is_empty());
    assert!(tracker.scroll_observer().tracked().is_empty());
}

#[test]
fn test_scroll_burst_evaluates_latest_sample() {
    let mut tracker = tracker(ScriptedHost::available());

    tracker.on_scroll(sample(900.0, 2000.0, 1000.0), 0);
    tracker.on_scroll(sample(300.0, 2000.0, 1000.0), 40);
    let deadline = tracker.on_scroll(sample(100.0, 2000.0, 1000.0), 80);
    assert_eq!(deadline, Some(180));

    // nothing runs before the quiet period ends
    assert!(tracker.on_timer(179).is_empty());
    // 10% reaches no milestone
    assert!(tracker.on_timer(180).is_empty());
    assert!(tracker.dispatcher().host().calls().is_empty());
}

#[test]
fn test_navigation_ignores_bare_fragments() {
    let mut tracker = tracker(ScriptedHost::available());

    assert_eq!(tracker.on_navigation_click(&StaticLink::new("#")), None);
    assert_eq!(tracker.on_navigation_click(&StaticLink::new("")), None);
    assert_eq!(tracker.on_navigation_click(&StaticLink::default()), None);
    assert!(tracker.dispatcher().host().calls().is_empty());
}

#[test]
fn test_outbound_click_carries_host_text_and_url() {
    let mut tracker = tracker(ScriptedHost::available());

    assert_eq!(
        tracker.on_outbound_click(&StaticLink::new("https://heliomedeiros.com/cv")),
        None
    );

    let link = StaticLink::new("https://www.linkedin.com/in/heliomedeiros").with_text("LinkedIn");
    assert_eq!(
        tracker.on_outbound_click(&link),
        Some(DispatchOutcome::Delivered)
    );

    let calls = tracker.dispatcher().host().calls();
    assert_eq!(calls.len(), 1);
    let params = &calls[0].parameters;
    assert_eq!(params["event_category"], "outbound");
    assert_eq!(params["event_label"], "www.linkedin.com");
    assert_eq!(params["link_text"], "LinkedIn");
    assert_eq!(params["link_url"], "https://www.linkedin.com/in/heliomedeiros");
}

#[test]
fn test_email_reveal_ignores_other_insertions() {
    let mut tracker = tracker(ScriptedHost::available());

    let records = [
        MutationRecord {
            kind: MutationKind::ChildList,
            added_nodes: vec![AddedNode {
                tag_name: Some("SPAN".to_string()),
                href: None,
            }],
        },
        MutationRecord {
            kind: MutationKind::Attributes,
            added_nodes: vec![AddedNode::anchor("mailto:hello@heliomedeiros.com")],
        },
        MutationRecord {
            kind: MutationKind::ChildList,
            added_nodes: vec![AddedNode::anchor("mailto:hello@heliomedeiros.com")],
        },
    ];

    let outcomes = tracker.on_mutations(&records);

    assert_eq!(outcomes, vec![DispatchOutcome::Delivered]);
    assert_eq!(tracker.dispatcher().host().calls()[0].name, "email_revealed");
}

// ============================================
// Page Wiring
// ============================================

#[test]
fn test_page_lifecycle_with_late_library() {
    let mut tracker = tracker(ScriptedHost::unavailable());

    assert_eq!(tracker.poll_readiness(0), Readiness::Waiting);
    tracker.on_navigation_click(&StaticLink::new("#about"));

    let host = tracker.dispatcher_mut().host_mut();
    host.set_available(true);
    host.set_loaded(true);
    assert_eq!(tracker.poll_readiness(300), Readiness::Ready);
    assert_eq!(tracker.next_readiness_poll(300), None);

    tracker.on_contact_click();

    let dispatcher = tracker.into_dispatcher();
    assert_eq!(dispatcher.stats().queued, 1);
    assert_eq!(dispatcher.stats().delivered, 1);
    assert_eq!(dispatcher.host().page_queue().len(), 1);
}

#[test]
fn test_subscriptions_are_passive_and_configured() {
    let mut tracker = tracker(ScriptedHost::available());
    assert_eq!(tracker.poll_readiness(0), Readiness::Ready);
    assert_eq!(tracker.subscriptions().len(), 6);

    for subscription in tracker.subscriptions() {
        match subscription {
            Subscription::Scroll { passive, throttle_ms } => {
                assert!(*passive);
                assert_eq!(*throttle_ms, 100);
            }
            Subscription::Intersection {
                threshold,
                root_margin,
                ..
            } => {
                assert_eq!(*threshold, 0.6);
                assert_eq!(root_margin, "-80px 0px");
            }
            Subscription::Click { passive, .. } => assert!(*passive),
            Subscription::ChildList { target_id } => assert_eq!(target_id, "email-display"),
        }
    }
}

// ============================================
// Security Headers
// ============================================

#[test]
fn test_headers_follow_loaded_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[site]
production = true

[security]
script_origins = ["https://www.googletagmanager.com", "https://cdn.example.com"]
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let headers = SecurityHeaders::from_config(&config.security).unwrap();

    let mut response = HeaderMap::new();
    headers.apply(&mut response, config.site.production);
    assert_eq!(response.len(), 3);
    assert_eq!(response["x-frame-options"], "DENY");

    let csp = ContentSecurityPolicy::from_config(&config.security).render();
    assert!(csp.starts_with("default-src 'self'; "));
    assert!(csp.contains("https://www.googletagmanager.com https://cdn.example.com"));
    assert!(csp.contains("font-src 'self' fonts.gstatic.com"));

    let tags = meta_tags(&config.security);
    assert!(!tags.contains("X-Frame-Options"));
}
