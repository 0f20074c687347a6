use crate::attributes::Attributes;
use crate::event::Level as ItemLevel;
use crate::notifier::Notifier;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate's own targets are never reported, so that
/// delivery diagnostics cannot feed back into delivery.
const OWN_TARGET: &str = "rollbar_notifier";

/// Default bound on delivery tasks alive at the same time.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1024;

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .map_or(false, |rest| rest.starts_with("::"))
}

/// `tracing_subscriber` layer that reports events to a [`Notifier`].
///
/// By default only `ERROR` events are reported. Each reported event is
/// delivered by its own task on the current Tokio runtime. At most
/// `max_in_flight` tasks run at once; events arriving while that many are
/// busy, or outside a runtime, are counted as dropped.
pub struct NotifierLayer {
    notifier: Arc<Notifier>,
    max_level: Level,
    in_flight: Arc<Semaphore>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events handed to a delivery task.
    pub reported_events: Arc<AtomicU64>,
    /// Dropped because no runtime was available or too many deliveries
    /// were in flight.
    pub dropped_events: Arc<AtomicU64>,
}

impl NotifierLayer {
    pub fn new(notifier: Arc<Notifier>) -> Self {
        NotifierLayer {
            notifier,
            max_level: Level::ERROR,
            in_flight: Arc::new(Semaphore::new(DEFAULT_MAX_IN_FLIGHT)),
            total_events: Arc::new(AtomicU64::new(0)),
            reported_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Report events at `level` and anything more severe.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    /// Bound the number of concurrent delivery tasks (at least 1).
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.in_flight = Arc::new(Semaphore::new(max_in_flight.max(1)));
        self
    }
}

/// Map a `tracing` level onto the four item levels.
pub fn item_level(level: &Level) -> ItemLevel {
    match *level {
        Level::ERROR => ItemLevel::Error,
        Level::WARN => ItemLevel::Warning,
        Level::INFO => ItemLevel::Info,
        _ => ItemLevel::Debug,
    }
}

impl<S> Layer<S> for NotifierLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level || is_own_target(meta.target()) {
            return;
        }

        let mut attributes = Attributes::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            attributes: &mut attributes,
            message: &mut message,
        };
        event.record(&mut visitor);
        attributes
            .custom
            .insert("target".to_string(), meta.target().to_string());

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("no tokio runtime, dropping reported event");
                return;
            }
        };

        let permit = match Arc::clone(&self.in_flight).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("too many deliveries in flight, dropping reported event");
                return;
            }
        };

        let level = item_level(meta.level());
        let notifier = Arc::clone(&self.notifier);
        self.reported_events.fetch_add(1, Ordering::Relaxed);
        handle.spawn(async move {
            notifier
                .notify(level, message.as_deref(), None, Some(&attributes))
                .await;
            drop(permit);
        });
    }
}

/// Collects event fields: `message` becomes the item message, every other
/// field becomes a custom field.
pub struct FieldVisitor<'a> {
    pub attributes: &'a mut Attributes,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: String) {
        self.attributes.custom.insert(field.name().to_string(), value);
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, format!("{:?}", value));
        }
    }
}
