//! Error types for exec-queue.
//!
//! Absence (no queue, nothing to pop) is never an error; operations return
//! `Option` for that.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A stored payload could not be encoded or decoded.
    #[error("malformed payload at {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The shared store is unreachable or rejected the command.
    #[error("store unavailable: {0}")]
    Store(#[from] redis::RedisError),

    /// Failure reported by a non-Redis backend.
    #[error("backend error: {0}")]
    Backend(String),

    /// Metadata and backlog writes of a combined create only partly landed.
    #[error("partial write creating queue {queue_id}: {source}")]
    PartialWrite {
        queue_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
