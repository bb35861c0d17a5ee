use crate::hook::MattermostHook;
use crate::level::Level;
use crate::pipeline::in_delivery;
use crate::record::LogEntry;
use std::collections::BTreeMap;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogEntry`]s and hands
/// them to a [`MattermostHook`].
///
/// Only events at or above the hook's minimum level are captured. Network
/// I/O happens on the hook's background worker, never on the thread that
/// emitted the event.
#[derive(Clone)]
pub struct MattermostLayer {
    hook: MattermostHook,
}

impl MattermostLayer {
    pub fn new(hook: MattermostHook) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> &MattermostHook {
        &self.hook
    }
}

/// Crates on the HTTP delivery path. Their connection tasks run outside the
/// worker's delivery scope, so they are matched by target instead.
const TRANSPORT_TARGETS: &[&str] = &["hyper", "hyper_util", "h2", "reqwest", "rustls", "want"];

fn has_target_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

/// Events emitted by this crate describe deliveries; forwarding them would
/// feed the pipeline its own diagnostics.
fn is_own_event(target: &str) -> bool {
    has_target_prefix(target, env!("CARGO_CRATE_NAME"))
}

fn is_transport_event(target: &str) -> bool {
    TRANSPORT_TARGETS
        .iter()
        .any(|prefix| has_target_prefix(target, prefix))
}

/// True for events that a delivery produced, directly or through the
/// transport it uses.
fn is_delivery_event(target: &str) -> bool {
    in_delivery() || is_own_event(target) || is_transport_event(target)
}

impl<S> Layer<S> for MattermostLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(meta.level());
        if !self.hook.is_enabled(level) || is_delivery_event(meta.target()) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let entry = LogEntry {
            level,
            message: message.unwrap_or_default(),
            fields,
        };

        if let Err(e) = self.hook.fire(&entry) {
            eprintln!("mattermost hook dropped log event: {}", e);
        }
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `format_args!` messages arrive here rather than in `record_str`.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
