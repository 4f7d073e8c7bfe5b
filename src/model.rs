//! Core data model.
//!
//! A queue is a metadata record plus an ordered backlog of detail items, both
//! keyed by the queue id. The queue engine never interprets either payload;
//! it only stores and returns them verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Execution Queue
// ---------------------------------------------------------------------------

/// Metadata record describing a queue's originating context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQueue {
    /// Unique identifier. Primary key of the record.
    pub queue_id: String,

    /// Caller-defined fields, stored alongside `queueId` in the same object.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ExecutionQueue {
    pub fn new(queue_id: impl Into<String>) -> Self {
        Self {
            queue_id: queue_id.into(),
            attributes: Map::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

// ---------------------------------------------------------------------------
// Execution Queue Detail
// ---------------------------------------------------------------------------

/// One unit of ordered work belonging to a queue.
///
/// Encoded as a plain JSON object. Consumed exactly once by a pop and never
/// mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionQueueDetail {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ExecutionQueueDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl From<Map<String, Value>> for ExecutionQueueDetail {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Observable lifecycle state of a queue in the shared store.
///
/// A queue that was never created and one that has been drained look the
/// same from the store, so both report `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueueStatus {
    Absent,
    Active { has_metadata: bool, size: u64 },
}

impl QueueStatus {
    pub fn is_active(self) -> bool {
        matches!(self, QueueStatus::Active { .. })
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Absent => write!(f, "absent"),
            QueueStatus::Active { has_metadata, size } => {
                write!(f, "active (metadata: {has_metadata}, size: {size})")
            }
        }
    }
}
