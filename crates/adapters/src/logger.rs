//! `tracing` logger adapter.

use bootstrap_ports::{LogEvent, LogLevel, LoggerPort};
use bootstrap_shared::redaction::{REDACTED, is_secret_key};
use serde_json::Value;

/// Forwards [`LogEvent`]s to the `tracing` dispatcher.
///
/// Fields are flattened into a single JSON `fields` attribute; values stored
/// under secret-looking keys are replaced with [`REDACTED`] on the way out.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    min_level: LogLevel,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLogger {
    /// Create a logger forwarding `info` and above.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum forwarded level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let fields = encode_fields(&event);
        let name = &*event.event;
        let message = &*event.message;
        match event.level {
            LogLevel::Debug => tracing::debug!(event = name, fields = %fields, "{message}"),
            LogLevel::Info => tracing::info!(event = name, fields = %fields, "{message}"),
            LogLevel::Warn => tracing::warn!(event = name, fields = %fields, "{message}"),
            LogLevel::Error => tracing::error!(event = name, fields = %fields, "{message}"),
        }
    }
}

fn encode_fields(event: &LogEvent) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in &event.fields {
        let value = if is_secret_key(key) {
            Value::String(REDACTED.to_string())
        } else {
            value.clone()
        };
        map.insert(key.to_string(), value);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            let guard = self.0.lock().expect("buffer lock");
            String::from_utf8_lossy(&guard).into_owned()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(logger: TracingLogger, event: LogEvent) -> String {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || logger.log(event));
        buffer.contents()
    }

    #[test]
    fn forwards_message_and_fields() {
        let event = LogEvent::new("config.env_override", LogLevel::Info, "override applied")
            .with_field("envVar", "SERVICE_PORT");
        let output = capture(TracingLogger::new(), event);

        assert!(output.contains("INFO"));
        assert!(output.contains("override applied"));
        assert!(output.contains("config.env_override"));
        assert!(output.contains("SERVICE_PORT"));
    }

    #[test]
    fn redacts_secret_field_names() {
        let event = LogEvent::new("config.env_override", LogLevel::Info, "override applied")
            .with_field("accessToken", "abc123");
        let output = capture(TracingLogger::new(), event);

        assert!(output.contains(REDACTED));
        assert!(!output.contains("abc123"));
    }

    #[test]
    fn drops_events_below_min_level() {
        let event = LogEvent::new("config.index", LogLevel::Debug, "indexed paths");
        assert!(capture(TracingLogger::new(), event.clone()).is_empty());

        let output = capture(TracingLogger::new().with_min_level(LogLevel::Debug), event);
        assert!(output.contains("indexed paths"));
    }
}
