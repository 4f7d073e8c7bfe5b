//! Integration tests for telemetry initialization and span helpers.

use exec_queue::telemetry::queue::{TeardownReason, record_teardown, start_queue_span};

#[test]
fn telemetry_initializes_without_endpoint() {
    // Note: tracing subscriber can only be set once per process.
    // Using try_init() in the implementation avoids panics if another
    // test already initialized a subscriber.
    let config = exec_queue::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "exq-test".to_string(),
        log_level: "debug".to_string(),
    };
    // This may return Err if a global subscriber was already set by
    // another test in this process; that is acceptable.
    let _guard = exec_queue::telemetry::init_telemetry(config);
}

#[test]
fn queue_span_creates_and_records_teardown() {
    let span = start_queue_span("pop", "q-1");
    record_teardown(&span, TeardownReason::Drained);
}

#[test]
fn teardown_reasons_have_stable_labels() {
    assert_eq!(TeardownReason::Drained.as_str(), "drained");
    assert_eq!(TeardownReason::Empty.as_str(), "empty");
    assert_eq!(TeardownReason::Explicit.as_str(), "explicit");
}
