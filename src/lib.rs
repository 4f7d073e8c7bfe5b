//! # exec-queue
//!
//! Distributed execution queues kept in a shared key-value store.
//!
//! Producers create a queue record and append ordered detail items under a
//! queue id; consumers pop them one at a time from any process. A queue tears
//! itself down once its backlog is drained, and abandoned queues expire on
//! their own after a time-to-live.
//!
//! The store is reached through the [`backend::QueueBackend`] capability
//! trait: [`backend::RedisBackend`] for deployments, [`backend::MemoryBackend`]
//! for tests.

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod queue;
pub mod telemetry;

pub use error::{Error, Result};
pub use model::{ExecutionQueue, ExecutionQueueDetail, QueueStatus};
pub use queue::ExecutionQueueStore;
