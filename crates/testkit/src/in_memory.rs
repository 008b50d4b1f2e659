//! In-memory logger doubles for port contracts.

use bootstrap_ports::{LogEvent, LoggerPort};
use std::sync::{Mutex, PoisonError};

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}
}

/// Logger that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded events with the given event name.
    pub fn events_named(&self, name: &str) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|event| &*event.event == name)
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, event: LogEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
