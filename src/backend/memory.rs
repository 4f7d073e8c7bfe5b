//! In-process backend with Redis-like semantics (for testing).
//!
//! Deadlines use `tokio::time::Instant`, so tests running on a paused clock
//! can advance past a TTL without sleeping.

use super::QueueBackend;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const WRONG_TYPE: &str = "WRONGTYPE operation against a key holding the wrong kind of value";

enum Slot {
    Text(String),
    List(VecDeque<String>),
}

struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// In-memory stand-in for the networked store. One instance is one store;
/// wrap it in an `Arc` to share it between queue stores.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys.
    pub async fn key_count(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.len()
    }
}

/// Look up `key`, evicting it first if its deadline has passed.
fn live_entry<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    if entries
        .get(key)
        .is_some_and(|entry| entry.is_expired(Instant::now()))
    {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn wrong_type() -> Error {
    Error::Backend(WRONG_TYPE.to_string())
}

#[async_trait]
impl QueueBackend for MemoryBackend {
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if live_entry(&mut entries, key).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                slot: Slot::Text(value),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(None),
            Some(Entry {
                slot: Slot::Text(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn push_back(&self, key: &str, values: Vec<String>, ttl: Duration) -> Result<u64> {
        if values.is_empty() {
            return self.len(key).await;
        }
        let mut entries = self.entries.lock().await;
        let deadline = Instant::now() + ttl;
        match live_entry(&mut entries, key) {
            Some(Entry {
                slot: Slot::List(list),
                expires_at,
            }) => {
                list.extend(values);
                *expires_at = Some(deadline);
                Ok(list.len() as u64)
            }
            Some(_) => Err(wrong_type()),
            None => {
                let list: VecDeque<String> = values.into();
                let len = list.len() as u64;
                entries.insert(
                    key.to_string(),
                    Entry {
                        slot: Slot::List(list),
                        expires_at: Some(deadline),
                    },
                );
                Ok(len)
            }
        }
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        let (head, now_empty) = match live_entry(&mut entries, key) {
            None => return Ok(None),
            Some(Entry {
                slot: Slot::List(list),
                ..
            }) => {
                let head = list.pop_front();
                (head, list.is_empty())
            }
            Some(_) => return Err(wrong_type()),
        };
        // An emptied list stops existing, as in Redis.
        if now_empty {
            entries.remove(key);
        }
        Ok(head)
    }

    async fn len(&self, key: &str) -> Result<u64> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(0),
            Some(Entry {
                slot: Slot::List(list),
                ..
            }) => Ok(list.len() as u64),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn index(&self, key: &str, index: u64) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            None => Ok(None),
            Some(Entry {
                slot: Slot::List(list),
                ..
            }) => Ok(usize::try_from(index)
                .ok()
                .and_then(|i| list.get(i).cloned())),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
