//! Structured logging boundary contract.
//!
//! The override engine never talks to a logging backend directly; it emits
//! [`LogEvent`]s through a [`LoggerPort`] supplied by the host process.

use std::collections::BTreeMap;
use std::fmt;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name, e.g. `config.env_override`.
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message (already redacted).
    pub message: Box<str>,
    /// Structured fields.
    pub fields: LogFields,
}

impl LogEvent {
    /// Build an event without fields.
    pub fn new(event: &str, level: LogLevel, message: impl Into<Box<str>>) -> Self {
        Self {
            event: event.into(),
            level,
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    /// Attach a string field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }

    /// Returns a string field by name.
    #[must_use]
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str) {
        self.log(LogEvent::new(event, LogLevel::Debug, message));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str) {
        self.log(LogEvent::new(event, LogLevel::Info, message));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str) {
        self.log(LogEvent::new(event, LogLevel::Warn, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        events: Mutex<Vec<LogEvent>>,
    }

    impl LoggerPort for Capture {
        fn log(&self, event: LogEvent) {
            if let Ok(mut guard) = self.events.lock() {
                guard.push(event);
            }
        }
    }

    #[test]
    fn convenience_methods_set_levels() {
        let capture = Capture::default();
        capture.debug("a", "one");
        capture.info("b", "two");
        capture.warn("c", "three");

        let events = capture.events.lock().expect("capture lock");
        let levels: Vec<LogLevel> = events.iter().map(|event| event.level).collect();
        assert_eq!(levels, vec![LogLevel::Debug, LogLevel::Info, LogLevel::Warn]);
        assert_eq!(&*events[1].message, "two");
    }

    #[test]
    fn fields_are_readable_as_strings() {
        let event = LogEvent::new("config.env_override", LogLevel::Info, "msg")
            .with_field("envVar", "SERVICE_PORT");
        assert_eq!(event.field_str("envVar"), Some("SERVICE_PORT"));
        assert_eq!(event.field_str("missing"), None);
        assert!(LogLevel::Debug < LogLevel::Error);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
