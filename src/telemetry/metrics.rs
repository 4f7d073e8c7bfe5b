//! Metric instrument factories for exec-queue.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"exec-queue"` meter.

use opentelemetry::metrics::{Counter, Meter};

/// Returns the shared meter for exec-queue instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("exec-queue")
}

/// Counter: queue operations.
/// Labels: `operation`, `result` ("ok" | "absent" | "skipped" | "error").
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("exq.queue.operations")
        .with_description("Number of execution queue operations")
        .build()
}

/// Counter: queue teardowns.
/// Labels: `reason` ("drained" | "empty" | "explicit").
pub fn queue_teardowns() -> Counter<u64> {
    meter()
        .u64_counter("exq.queue.teardowns")
        .with_description("Number of queue teardowns")
        .build()
}

/// Counter: detail items appended to backlogs.
pub fn details_appended() -> Counter<u64> {
    meter()
        .u64_counter("exq.queue.details_appended")
        .with_description("Number of detail items appended to queue backlogs")
        .build()
}
