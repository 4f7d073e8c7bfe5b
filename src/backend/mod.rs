//! Capability interface over the shared key-value store.
//!
//! The queue logic needs only a handful of primitives: set-if-absent with a
//! TTL, an atomic batch append that refreshes the TTL, an atomic head pop,
//! indexed list reads, and key deletion. Anything providing them atomically
//! across processes can back an [`crate::ExecutionQueueStore`].

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Store `value` under `key` with a TTL unless the key already exists.
    /// Returns whether the write happened.
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Append `values` to the tail of the list at `key` in one atomic step and
    /// reset the key's TTL. Returns the new list length.
    async fn push_back(&self, key: &str, values: Vec<String>, ttl: Duration) -> Result<u64>;

    /// Atomically remove and return the head of the list at `key`.
    async fn pop_front(&self, key: &str) -> Result<Option<String>>;

    /// Length of the list at `key`; 0 when the key is absent.
    async fn len(&self, key: &str) -> Result<u64>;

    async fn index(&self, key: &str, index: u64) -> Result<Option<String>>;

    /// Delete every key in `keys`. Absent keys are ignored.
    async fn delete(&self, keys: &[&str]) -> Result<()>;
}

#[async_trait]
impl<T: QueueBackend + ?Sized> QueueBackend for Arc<T> {
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool> {
        (**self).set_if_absent(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn push_back(&self, key: &str, values: Vec<String>, ttl: Duration) -> Result<u64> {
        (**self).push_back(key, values, ttl).await
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>> {
        (**self).pop_front(key).await
    }

    async fn len(&self, key: &str) -> Result<u64> {
        (**self).len(key).await
    }

    async fn index(&self, key: &str, index: u64) -> Result<Option<String>> {
        (**self).index(key, index).await
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        (**self).delete(keys).await
    }
}
