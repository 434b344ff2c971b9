//! In-memory diagnostic capture for deterministic test assertions
//!
//! The engine's recoverable-absence diagnostics carry a fixed message
//! plus structured fields naming the skipped entity (`entry`, `group`,
//! `index`, `source`). This module provides a test-only subscriber
//! layer that records every emitted event so tests can assert a bulk
//! operation reported exactly the expected skips.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::field::Visit;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// A captured diagnostic with its message and structured fields
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// True for a warning whose message and named field both match
    pub fn is_warning(&self, message: &str, field: &str, value: &str) -> bool {
        self.level == Level::WARN
            && self.message.as_deref() == Some(message)
            && self.fields.get(field).map(String::as_str) == Some(value)
    }
}

struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

/// Capture layer for collecting diagnostics
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn new() -> (Self, DiagnosticCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = Self {
            events: events.clone(),
        };
        let capture = DiagnosticCapture { events };
        (layer, capture)
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        // The event macro records its format string under "message"
        let message = visitor.fields.remove("message");
        let captured = CapturedEvent {
            level: *metadata.level(),
            message,
            fields: visitor.fields,
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Handle for accessing captured diagnostics in tests
pub struct DiagnosticCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl DiagnosticCapture {
    /// Get all captured events
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Get the captured warning-severity events
    pub fn warnings(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == Level::WARN)
            .collect()
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Assert that exactly one warning with the given message names the
    /// given entity in the given field
    ///
    /// # Panics
    ///
    /// Panics if no such warning, or more than one, was captured
    pub fn assert_single_warning(&self, message: &str, field: &str, value: &str) {
        let count = self.count_events(|e| e.is_warning(message, field, value));
        assert_eq!(
            count,
            1,
            "Expected exactly one warning `{}` with {}={}, found {} among {} captured events",
            message,
            field,
            value,
            count,
            self.events().len()
        );
    }

    /// Clear all captured events
    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

impl Clone for DiagnosticCapture {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

use std::sync::OnceLock;

static GLOBAL_CAPTURE: OnceLock<DiagnosticCapture> = OnceLock::new();

/// Install the capture layer and return the shared capture handle
///
/// This should be called at the start of each test that asserts on
/// diagnostics. The layer is installed globally once per test binary;
/// every call returns the same shared capture instance, so tests
/// running in parallel must filter by fields unique to their fixture
/// rather than asserting on the full event list.
pub fn init_capture() -> DiagnosticCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = CaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}
