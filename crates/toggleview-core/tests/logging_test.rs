#![forbid(unsafe_code)]
#![cfg(feature = "tracing")]

//! Structured logging emitted by the controller.
//!
//! Run:
//!   cargo test -p toggleview-core --features tracing --test logging_test

use std::sync::{Arc, Mutex};
use std::time::Duration;

use toggleview_core::{HitRects, PanelConfig, PanelController, PointerSample, Rect};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: Vec<(String, String)>,
    span: Option<String>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let span = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.0,
            span,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let layer = EventCapture::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn hits() -> HitRects {
    HitRects::new(
        Rect::new(0.0, 0.0, 300.0, 600.0),
        Rect::new(300.0, 0.0, 700.0, 600.0),
    )
}

fn drag_and_release() {
    let config = PanelConfig::for_viewport(1000.0, 300.0).with_initial_offset(1000.0);
    let mut c = PanelController::new(config).unwrap();
    c.on_pointer_down(PointerSample::new(500.0, 300.0, 0), &hits());
    c.on_pointer_move(PointerSample::new(450.0, 300.0, 16_000_000));
    c.on_pointer_move(PointerSample::new(200.0, 300.0, 32_000_000));
    c.on_pointer_up(PointerSample::new(200.0, 300.0, 40_000_000));
    while c.is_settling() {
        c.tick(Duration::from_millis(16));
    }
}

#[test]
fn lifecycle_is_logged_at_debug() {
    let events = capture(drag_and_release);
    let debug: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::DEBUG)
        .map(|e| e.message.as_str())
        .collect();
    for expected in ["drag started", "settle started", "settled"] {
        assert!(
            debug.contains(&expected),
            "missing {expected:?} in {debug:?}"
        );
    }
}

#[test]
fn settle_events_carry_structured_fields() {
    let events = capture(drag_and_release);
    let started = events
        .iter()
        .find(|e| e.message == "settle started")
        .expect("settle started event");
    assert_eq!(started.field("target"), Some("0"));
    assert!(started.field("velocity").is_some());
    assert!(started.field("offset").is_some());

    let settled = events
        .iter()
        .find(|e| e.message == "settled")
        .expect("settled event");
    assert_eq!(settled.field("limit"), Some("0"));
    assert_eq!(settled.span.as_deref(), Some("settle_tick"));
}

#[test]
fn ignored_input_is_trace_only() {
    let events = capture(|| {
        let mut c = PanelController::new(PanelConfig::default()).unwrap();
        c.on_pointer_move(PointerSample::new(10.0, 10.0, 0));
        c.on_pointer_down(PointerSample::new(5000.0, 5000.0, 0), &hits());
        c.tick(Duration::from_millis(16));
    });
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.level == tracing::Level::TRACE));
}
