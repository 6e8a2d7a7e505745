//! Browser binding.
//!
//! `GtagHost` reaches the page's `window.gtag` and `window.dataLayer` through
//! reflection, so a missing or replaced global is observed on every call.
//! `WasmTracker` is the object the page script creates; its methods are the
//! callbacks for the subscriptions it lists.

use js_sys::{Array, Function, Reflect};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bootstrap::Bootstrap;
use crate::config::Config;
use crate::dispatch::AnalyticsHost;
use crate::error::{Error, Result};
use crate::observers::{
    AddedNode, IntersectionEntry, MutationKind, MutationRecord, ScrollSample, StaticLink,
};
use crate::tracker::Tracker;
use crate::types::Parameters;

const GTAG: &str = "gtag";
const DATA_LAYER: &str = "dataLayer";
const LOADED_MARKER: &str = "gtm.load";

/// `window.gtag`, looked up on every use.
#[derive(Debug, Default)]
pub struct GtagHost;

impl GtagHost {
    fn global(name: &str) -> Option<JsValue> {
        Reflect::get(&js_sys::global(), &JsValue::from_str(name))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }

    fn gtag() -> Option<Function> {
        Self::global(GTAG).and_then(|v| v.dyn_into::<Function>().ok())
    }
}

impl AnalyticsHost for GtagHost {
    fn is_available(&self) -> bool {
        Self::gtag().is_some()
    }

    fn call(&mut self, command: &str, name: &str, parameters: &Parameters) -> Result<()> {
        let gtag = Self::gtag().ok_or_else(|| Error::Host("gtag disappeared".to_string()))?;
        let json = serde_json::to_string(parameters)?;
        let params = js_sys::JSON::parse(&json)
            .map_err(|e| Error::Host(format!("failed to build parameters: {e:?}")))?;
        gtag.call3(
            &JsValue::UNDEFINED,
            &JsValue::from_str(command),
            &JsValue::from_str(name),
            &params,
        )
        .map(|_| ())
        .map_err(|e| Error::Host(format!("{e:?}")))
    }

    fn enqueue(&mut self, entry: &Value) {
        let global = js_sys::global();
        let key = JsValue::from_str(DATA_LAYER);
        let layer = match Self::global(DATA_LAYER) {
            Some(layer) if Array::is_array(&layer) => Array::from(&layer),
            _ => {
                let layer = Array::new();
                if Reflect::set(&global, &key, &layer).is_err() {
                    return;
                }
                layer
            }
        };
        let Ok(json) = serde_json::to_string(entry) else {
            return;
        };
        if let Ok(value) = js_sys::JSON::parse(&json) {
            layer.push(&value);
        }
    }

    fn has_loaded_marker(&self) -> bool {
        let Some(layer) = Self::global(DATA_LAYER) else {
            return false;
        };
        if !Array::is_array(&layer) {
            return false;
        }
        Array::from(&layer).iter().any(|entry| {
            entry.is_object()
                && Reflect::get(&entry, &JsValue::from_str("event"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .is_some_and(|event| event == LOADED_MARKER)
        })
    }
}

/// Tracker handle exported to the page script.
#[wasm_bindgen]
pub struct WasmTracker {
    inner: Tracker<GtagHost>,
    hostname: String,
}

#[wasm_bindgen]
impl WasmTracker {
    #[wasm_bindgen(constructor)]
    pub fn new(hostname: String, now_ms: f64) -> WasmTracker {
        let mut config = Config::default();
        config.site.hostname = hostname.clone();
        WasmTracker {
            inner: Tracker::new(GtagHost, &config, now_ms as u64),
            hostname,
        }
    }

    /// Send `gtag('config', measurementId, ...)` with the site's cookie
    /// settings. Returns `false` when `gtag` is missing.
    pub fn configure(&mut self, measurement_id: String) -> std::result::Result<bool, JsValue> {
        Bootstrap::new(measurement_id, self.hostname.clone())
            .configure(self.inner.dispatcher_mut().host_mut())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Subscriptions to register, as an array of plain objects. Empty until
    /// `pollReadiness` stops returning `"waiting"`.
    pub fn subscriptions(&self) -> std::result::Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.inner.subscriptions())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        js_sys::JSON::parse(&json)
    }

    /// `"waiting"`, `"ready"` or `"gave_up"`.
    #[wasm_bindgen(js_name = pollReadiness)]
    pub fn poll_readiness(&mut self, now_ms: f64) -> String {
        match self.inner.poll_readiness(now_ms as u64) {
            crate::readiness::Readiness::Waiting => "waiting",
            crate::readiness::Readiness::Ready => "ready",
            crate::readiness::Readiness::GaveUp => "gave_up",
        }
        .to_string()
    }

    /// Returns the time at which `onTimer` should run.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(
        &mut self,
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
        now_ms: f64,
    ) -> Option<f64> {
        let sample = ScrollSample {
            scroll_top,
            scroll_height,
            viewport_height,
        };
        self.inner
            .on_scroll(sample, now_ms as u64)
            .map(|deadline| deadline as f64)
    }

    #[wasm_bindgen(js_name = onTimer)]
    pub fn on_timer(&mut self, now_ms: f64) -> usize {
        self.inner.on_timer(now_ms as u64).len()
    }

    /// One intersection notification batch, as a JSON array of
    /// `{is_intersecting, target_id}` entries. Returns how many sections were
    /// dispatched.
    #[wasm_bindgen(js_name = onSections)]
    pub fn on_sections(&mut self, entries_json: &str) -> std::result::Result<usize, JsValue> {
        let entries: Vec<IntersectionEntry> = serde_json::from_str(entries_json)
            .map_err(|e| JsValue::from_str(&format!("invalid intersection entries: {e}")))?;
        Ok(self.inner.on_sections(&entries).len())
    }

    #[wasm_bindgen(js_name = onNavigationClick)]
    pub fn on_navigation_click(&mut self, href: Option<String>) {
        let link = StaticLink {
            href,
            ..Default::default()
        };
        self.inner.on_navigation_click(&link);
    }

    #[wasm_bindgen(js_name = onContactClick)]
    pub fn on_contact_click(&mut self) {
        self.inner.on_contact_click();
    }

    #[wasm_bindgen(js_name = onOutboundClick)]
    pub fn on_outbound_click(
        &mut self,
        href: Option<String>,
        hostname: Option<String>,
        text: Option<String>,
    ) {
        let link = StaticLink {
            href,
            hostname,
            text,
        };
        self.inner.on_outbound_click(&link);
    }

    /// One node added to the email container.
    #[wasm_bindgen(js_name = onEmailNode)]
    pub fn on_email_node(&mut self, tag_name: Option<String>, href: Option<String>) {
        self.inner.on_mutations(&[MutationRecord {
            kind: MutationKind::ChildList,
            added_nodes: vec![AddedNode { tag_name, href }],
        }]);
    }

    /// Events queued while `gtag` was missing, as a JSON array.
    #[wasm_bindgen(js_name = pendingJson)]
    pub fn pending_json(&self) -> String {
        serde_json::to_string(self.inner.dispatcher().pending().entries())
            .unwrap_or_else(|_| "[]".to_string())
    }
}
