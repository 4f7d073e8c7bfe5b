//! Tests for the in-memory backend's Redis-like semantics.

use exec_queue::Error;
use exec_queue::backend::{MemoryBackend, QueueBackend};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(30);

fn items(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn set_if_absent_only_writes_once() {
    let backend = MemoryBackend::new();
    assert!(backend.set_if_absent("k", "one".into(), TTL).await.unwrap());
    assert!(!backend.set_if_absent("k", "two".into(), TTL).await.unwrap());
    assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("one"));
}

#[tokio::test]
async fn list_push_pop_index() {
    let backend = MemoryBackend::new();
    assert_eq!(backend.push_back("l", items(&["a", "b"]), TTL).await.unwrap(), 2);
    assert_eq!(backend.push_back("l", items(&["c"]), TTL).await.unwrap(), 3);

    assert_eq!(backend.index("l", 2).await.unwrap().as_deref(), Some("c"));
    assert_eq!(backend.index("l", 3).await.unwrap(), None);

    assert_eq!(backend.pop_front("l").await.unwrap().as_deref(), Some("a"));
    assert_eq!(backend.len("l").await.unwrap(), 2);
}

#[tokio::test]
async fn emptied_list_key_disappears() {
    let backend = MemoryBackend::new();
    backend.push_back("l", items(&["only"]), TTL).await.unwrap();
    backend.pop_front("l").await.unwrap();

    assert_eq!(backend.key_count().await, 0);
    assert_eq!(backend.pop_front("l").await.unwrap(), None);
    assert_eq!(backend.len("l").await.unwrap(), 0);
}

#[tokio::test]
async fn delete_ignores_absent_keys() {
    let backend = MemoryBackend::new();
    backend.set_if_absent("a", "1".into(), TTL).await.unwrap();
    backend.delete(&["a", "missing"]).await.unwrap();
    backend.delete(&[]).await.unwrap();
    assert_eq!(backend.key_count().await, 0);
}

#[tokio::test]
async fn wrong_type_access_is_an_error() {
    let backend = MemoryBackend::new();
    backend.set_if_absent("s", "text".into(), TTL).await.unwrap();
    backend.push_back("l", items(&["x"]), TTL).await.unwrap();

    assert!(matches!(backend.len("s").await, Err(Error::Backend(_))));
    assert!(matches!(backend.pop_front("s").await, Err(Error::Backend(_))));
    assert!(matches!(
        backend.push_back("s", items(&["y"]), TTL).await,
        Err(Error::Backend(_))
    ));
    assert!(matches!(backend.get("l").await, Err(Error::Backend(_))));
}

#[tokio::test(start_paused = true)]
async fn keys_expire_and_push_refreshes_deadline() {
    let backend = MemoryBackend::new();
    backend.set_if_absent("s", "v".into(), TTL).await.unwrap();
    backend.push_back("l", items(&["a"]), TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(20)).await;
    backend.push_back("l", items(&["b"]), TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(15)).await;
    assert_eq!(backend.get("s").await.unwrap(), None);
    assert_eq!(backend.len("l").await.unwrap(), 2);

    // An expired key can be claimed again.
    assert!(backend.set_if_absent("s", "w".into(), TTL).await.unwrap());

    tokio::time::advance(Duration::from_secs(20)).await;
    assert_eq!(backend.len("l").await.unwrap(), 0);
    assert_eq!(backend.key_count().await, 1);
}
