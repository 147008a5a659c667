//! Log capture for unit tests.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// `(field, raw)` pairs of every WARN event that carries both values.
type Warnings = Arc<Mutex<Vec<(String, String)>>>;

struct WarningLayer(Warnings);

#[derive(Default)]
struct FieldVisitor {
    field: Option<String>,
    raw: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "field" => self.field = Some(value.to_string()),
            "raw" => self.raw = Some(value.to_string()),
            _ => (),
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: Subscriber> Layer<S> for WarningLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        if let (Some(field), Some(raw)) = (visitor.field, visitor.raw) {
            self.0.lock().unwrap().push((field, raw));
        }
    }
}

/// Runs `f` under a subscriber that records field-level warnings.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<(String, String)>) {
    let warnings = Warnings::default();
    let subscriber = tracing_subscriber::registry().with(WarningLayer(warnings.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = warnings.lock().unwrap().clone();
    (result, captured)
}
