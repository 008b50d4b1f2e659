//! Contract tests for the logger doubles.

use bootstrap_ports::{LogEvent, LogLevel, LoggerPort};
use bootstrap_testkit::{NoopLogger, RecordingLogger};

fn emit_override(logger: &dyn LoggerPort) {
    logger.log(
        LogEvent::new("config.env_override", LogLevel::Info, "override")
            .with_field("envVar", "SERVICE_PORT"),
    );
}

#[test]
fn loggers_are_usable_as_trait_objects() {
    let recorder = RecordingLogger::new();
    emit_override(&recorder);
    emit_override(&NoopLogger);

    let events = recorder.events_named("config.env_override");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field_str("envVar"), Some("SERVICE_PORT"));
    assert!(!recorder.is_empty());
}
