//! Capture `tracing` events emitted while a closure runs.
//!
//! The capture subscriber is installed with `set_default`, so it only sees
//! events from the current thread and does not disturb other tests.

use ahash::AHashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Target carrying diagnostics from the binding core.
pub const DIAGNOSTICS_TARGET: &str = "lingobind::diagnostics";

/// One captured event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: AHashMap<String, String>,
}

impl CapturedEvent {
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        self.target == DIAGNOSTICS_TARGET
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: AHashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }
}

/// Layer that stores every event it sees.
#[derive(Clone, Default)]
pub struct DiagnosticCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl DiagnosticCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events captured so far.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events on [`DIAGNOSTICS_TARGET`].
    #[must_use]
    pub fn diagnostics(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(CapturedEvent::is_diagnostic)
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Run `f` with a capturing subscriber as the thread default.
pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, DiagnosticCapture) {
    let capture = DiagnosticCapture::new();
    let subscriber = Registry::default().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
