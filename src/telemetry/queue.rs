//! Queue operation span helpers.

use tracing::Span;

/// Why a queue's keys were removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// A pop took the last backlog item.
    Drained,
    /// A pop found nothing to take.
    Empty,
    /// A caller asked for deletion.
    Explicit,
}

impl TeardownReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TeardownReason::Drained => "drained",
            TeardownReason::Empty => "empty",
            TeardownReason::Explicit => "explicit",
        }
    }
}

/// Start a span for one queue operation.
///
/// The `queue.teardown` field is declared empty and can be filled via
/// [`record_teardown`].
pub fn start_queue_span(operation: &str, queue_id: &str) -> Span {
    tracing::info_span!(
        "queue.op",
        "queue.operation" = operation,
        "queue.id" = queue_id,
        "queue.teardown" = tracing::field::Empty,
    )
}

/// Record a teardown on the given span.
pub fn record_teardown(span: &Span, reason: TeardownReason) {
    span.record("queue.teardown", reason.as_str());
    span.in_scope(|| {
        tracing::debug!(reason = reason.as_str(), "queue_teardown");
    });
}
