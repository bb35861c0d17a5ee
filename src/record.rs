use std::collections::BTreeMap;
use std::fmt;

use crate::attachment::Attachment;
use crate::level::Level;

/// One log occurrence as handed over by the logging framework.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogEntry {
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a metadata value, replacing any previous value for `key`.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Immutable event queued for delivery.
///
/// `fields` is a `BTreeMap` so every consumer sees keys in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub attachment: Option<Attachment>,
}

impl LogEvent {
    /// Build the event from `entry`, deriving an attachment when a template
    /// is configured.
    pub fn new(entry: &LogEntry, template: Option<&Attachment>) -> Self {
        let attachment = template
            .map(|t| Attachment::for_event(t, entry.level, &entry.message, &entry.fields));

        LogEvent {
            level: entry.level,
            message: entry.message.clone(),
            fields: entry.fields.clone(),
            attachment,
        }
    }
}

/// Human-readable rendering of a metadata value.
///
/// Strings are written as-is, without surrounding quotes; any other value is
/// written as compact JSON.
pub struct RenderedValue<'a>(pub &'a serde_json::Value);

impl fmt::Display for RenderedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}
