//! Execution queue operations over a shared store.
//!
//! Each queue lives under two keys:
//! - `queue:{id}` holds the JSON metadata record (set once, never overwritten)
//! - `queue:detail:{id}` holds the backlog, a list of JSON detail items
//!
//! Both keys expire after the queue TTL (one day by default). Appending to
//! the backlog refreshes its TTL. A pop that empties the backlog, or finds
//! nothing to pop, deletes both keys.
//!
//! No state is cached in-process: every call goes to the backend, so any
//! number of processes can share a queue through the same store.

use crate::backend::QueueBackend;
use crate::error::{Error, Result};
use crate::model::{ExecutionQueue, ExecutionQueueDetail, QueueStatus};
use crate::telemetry::metrics;
use crate::telemetry::queue::{TeardownReason, record_teardown, start_queue_span};
use opentelemetry::KeyValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{Instrument, Span, debug, warn};

pub const QUEUE_PREFIX: &str = "queue:";
pub const QUEUE_DETAIL_PREFIX: &str = "queue:detail:";

/// Lifetime of queue keys when none is configured: one day.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Metadata key for a queue.
pub fn queue_key(queue_id: &str) -> String {
    format!("{QUEUE_PREFIX}{queue_id}")
}

/// Backlog key for a queue.
pub fn detail_key(queue_id: &str) -> String {
    format!("{QUEUE_DETAIL_PREFIX}{queue_id}")
}

/// Queue store bound to one backend. Holds no queue state of its own.
#[derive(Clone)]
pub struct ExecutionQueueStore<B> {
    backend: B,
    ttl: Duration,
}

impl<B: QueueBackend> ExecutionQueueStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_ttl(backend, DEFAULT_TTL)
    }

    pub fn with_ttl(backend: B, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store the queue's metadata record unless one already exists.
    ///
    /// A duplicate create keeps the existing record and is not an error.
    pub async fn create_queue(&self, queue: &ExecutionQueue) -> Result<()> {
        validate_queue_id(&queue.queue_id)?;
        let span = start_queue_span("create", &queue.queue_id);
        let result: Result<()> = async {
            let key = queue_key(&queue.queue_id);
            let payload = encode(&key, queue)?;
            if self.backend.set_if_absent(&key, payload, self.ttl).await? {
                debug!("queue created");
            } else {
                debug!("queue already exists, keeping existing record");
            }
            Ok(())
        }
        .instrument(span)
        .await;
        record_operation("create", outcome(&result));
        result
    }

    /// Append `details`, in order, to the tail of the queue's backlog and
    /// reset the backlog TTL. An empty batch does nothing.
    pub async fn append_details(
        &self,
        queue_id: &str,
        details: &[ExecutionQueueDetail],
    ) -> Result<()> {
        validate_queue_id(queue_id)?;
        let key = detail_key(queue_id);
        let payloads = encode_all(&key, details)?;
        self.push_encoded(queue_id, payloads).await
    }

    /// Create the queue record and append its first batch of details.
    ///
    /// If the record is written but the append fails, the error comes back
    /// as [`Error::PartialWrite`]; the record is left in place for the
    /// caller to delete or let expire.
    pub async fn create_queue_with_details(
        &self,
        queue: &ExecutionQueue,
        details: &[ExecutionQueueDetail],
    ) -> Result<()> {
        validate_queue_id(&queue.queue_id)?;
        let payloads = encode_all(&detail_key(&queue.queue_id), details)?;
        self.create_queue(queue).await?;
        self.push_encoded(&queue.queue_id, payloads)
            .await
            .map_err(|source| Error::PartialWrite {
                queue_id: queue.queue_id.clone(),
                source: Box::new(source),
            })
    }

    /// Remove and return the head of the backlog.
    ///
    /// Returns `None` when there is nothing to pop. Taking the last item, or
    /// finding none, tears the queue down before returning. Once an item has
    /// been popped it is always returned; a failed teardown after the pop is
    /// logged and left to the TTL.
    pub async fn pop_next(&self, queue_id: &str) -> Result<Option<ExecutionQueueDetail>> {
        validate_queue_id(queue_id)?;
        let span = start_queue_span("pop", queue_id);
        let result: Result<Option<ExecutionQueueDetail>> = async {
            let key = detail_key(queue_id);
            let Some(raw) = self.backend.pop_front(&key).await? else {
                self.teardown(queue_id, TeardownReason::Empty, &span).await?;
                return Ok(None);
            };

            // The pop, the length check and the teardown are three separate
            // store calls. Two consumers taking the last two items can both
            // see zero and both tear down; deletion is idempotent, so this
            // race is accepted. Do not merge these into one transaction.
            //
            // The item has already left the store here, so a failed check or
            // teardown must not swallow it. Leftover keys expire with the TTL.
            if let Err(e) = self.teardown_if_drained(queue_id, &key, &span).await {
                warn!(error = %e, "teardown after pop failed, returning popped item");
                record_operation("teardown", "error");
            }

            // A corrupt item is an error, never a silent `None`.
            decode(&key, &raw).map(Some)
        }
        .instrument(span.clone())
        .await;

        let label = match &result {
            Ok(Some(_)) => "ok",
            Ok(None) => "absent",
            Err(_) => "error",
        };
        record_operation("pop", label);
        result
    }

    /// Read the whole backlog in order without consuming it.
    ///
    /// Does not refresh the TTL or tear anything down.
    pub async fn list_details(&self, queue_id: &str) -> Result<Vec<ExecutionQueueDetail>> {
        validate_queue_id(queue_id)?;
        let key = detail_key(queue_id);
        let len = self.backend.len(&key).await?;

        let mut details = Vec::new();
        for index in 0..len {
            // A concurrent pop may shrink the list after the length read.
            let Some(raw) = self.backend.index(&key, index).await? else {
                break;
            };
            details.push(decode(&key, &raw)?);
        }
        Ok(details)
    }

    /// Look up the queue's metadata record.
    pub async fn get_queue(&self, queue_id: &str) -> Result<Option<ExecutionQueue>> {
        validate_queue_id(queue_id)?;
        let key = queue_key(queue_id);
        match self.backend.get(&key).await? {
            Some(raw) => decode(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Delete the queue's backlog and metadata. Deleting an absent queue is
    /// a no-op.
    pub async fn delete_queue(&self, queue_id: &str) -> Result<()> {
        validate_queue_id(queue_id)?;
        let span = start_queue_span("delete", queue_id);
        let result = self
            .teardown(queue_id, TeardownReason::Explicit, &span)
            .instrument(span.clone())
            .await;
        record_operation("delete", outcome(&result));
        result
    }

    /// Current backlog length; 0 if the queue does not exist.
    pub async fn size(&self, queue_id: &str) -> Result<u64> {
        validate_queue_id(queue_id)?;
        self.backend.len(&detail_key(queue_id)).await
    }

    /// Snapshot of whether the queue still has keys in the store.
    pub async fn status(&self, queue_id: &str) -> Result<QueueStatus> {
        validate_queue_id(queue_id)?;
        let has_metadata = self.backend.get(&queue_key(queue_id)).await?.is_some();
        let size = self.backend.len(&detail_key(queue_id)).await?;
        if !has_metadata && size == 0 {
            Ok(QueueStatus::Absent)
        } else {
            Ok(QueueStatus::Active { has_metadata, size })
        }
    }

    async fn push_encoded(&self, queue_id: &str, payloads: Vec<String>) -> Result<()> {
        let span = start_queue_span("append", queue_id);
        if payloads.is_empty() {
            span.in_scope(|| debug!("empty batch, nothing to append"));
            record_operation("append", "skipped");
            return Ok(());
        }

        let count = payloads.len() as u64;
        let result: Result<()> = async {
            let len = self
                .backend
                .push_back(&detail_key(queue_id), payloads, self.ttl)
                .await?;
            debug!(appended = count, backlog = len, "details appended");
            Ok(())
        }
        .instrument(span)
        .await;

        if result.is_ok() {
            metrics::details_appended().add(count, &[]);
        }
        record_operation("append", outcome(&result));
        result
    }

    async fn teardown_if_drained(&self, queue_id: &str, key: &str, span: &Span) -> Result<()> {
        if self.backend.len(key).await? == 0 {
            self.teardown(queue_id, TeardownReason::Drained, span).await?;
        }
        Ok(())
    }

    async fn teardown(&self, queue_id: &str, reason: TeardownReason, span: &Span) -> Result<()> {
        let detail = detail_key(queue_id);
        let meta = queue_key(queue_id);
        self.backend.delete(&[detail.as_str(), meta.as_str()]).await?;
        record_teardown(span, reason);
        metrics::queue_teardowns().add(1, &[KeyValue::new("reason", reason.as_str())]);
        Ok(())
    }
}

fn validate_queue_id(queue_id: &str) -> Result<()> {
    if queue_id.trim().is_empty() {
        return Err(Error::InvalidInput("queue id must not be empty".to_string()));
    }
    Ok(())
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| Error::Serialization {
        key: key.to_string(),
        source,
    })
}

fn encode_all<T: Serialize>(key: &str, values: &[T]) -> Result<Vec<String>> {
    values.iter().map(|value| encode(key, value)).collect()
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|source| Error::Serialization {
        key: key.to_string(),
        source,
    })
}

fn outcome<T>(result: &Result<T>) -> &'static str {
    if result.is_ok() { "ok" } else { "error" }
}

fn record_operation(operation: &'static str, result: &'static str) {
    metrics::queue_operations().add(
        1,
        &[
            KeyValue::new("operation", operation),
            KeyValue::new("result", result),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_shared_prefixes() {
        assert_eq!(queue_key("abc"), "queue:abc");
        assert_eq!(detail_key("abc"), "queue:detail:abc");
    }

    #[test]
    fn default_ttl_is_one_day() {
        assert_eq!(DEFAULT_TTL.as_secs(), 86_400);
    }

    #[test]
    fn blank_queue_ids_are_rejected() {
        assert!(matches!(validate_queue_id(""), Err(Error::InvalidInput(_))));
        assert!(matches!(validate_queue_id("  "), Err(Error::InvalidInput(_))));
        assert!(validate_queue_id("q-1").is_ok());
    }

    #[test]
    fn decode_reports_the_key() {
        let err = decode::<ExecutionQueueDetail>("queue:detail:q", "{not json").unwrap_err();
        match err {
            Error::Serialization { key, .. } => assert_eq!(key, "queue:detail:q"),
            other => panic!("expected Serialization, got {other:?}"),
        }
    }
}
