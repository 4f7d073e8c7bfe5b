//! Queue store tests against a live Redis.
//!
//! Run with:
//! ```sh
//! REDIS_URL=redis://localhost:6379 cargo test --test redis_test -- --ignored
//! ```

use exec_queue::backend::RedisBackend;
use exec_queue::{ExecutionQueue, ExecutionQueueDetail, ExecutionQueueStore, QueueStatus};

/// Helper: connect for tests.
/// Requires REDIS_URL env var or defaults to local dev.
async fn test_store() -> ExecutionQueueStore<RedisBackend> {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let backend = RedisBackend::connect(&url).await.unwrap();
    ExecutionQueueStore::new(backend)
}

/// Unique per run so repeated test runs don't collide.
fn unique_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

fn detail(resource: &str) -> ExecutionQueueDetail {
    ExecutionQueueDetail::new().field("resourceId", resource)
}

#[tokio::test]
#[ignore] // Requires running Redis
async fn connects_and_pings() {
    let store = test_store().await;
    assert!(store.backend().health_check().await.is_ok());
}

#[tokio::test]
#[ignore] // Requires running Redis
async fn create_pop_until_torn_down() {
    let store = test_store().await;
    let id = unique_id("exq-test");
    let queue = ExecutionQueue::new(&id).attribute("taskId", "t-1");

    store
        .create_queue_with_details(&queue, &[detail("A"), detail("B")])
        .await
        .unwrap();
    assert_eq!(store.list_details(&id).await.unwrap(), vec![detail("A"), detail("B")]);

    assert_eq!(store.pop_next(&id).await.unwrap(), Some(detail("A")));
    assert_eq!(store.size(&id).await.unwrap(), 1);
    assert_eq!(store.get_queue(&id).await.unwrap(), Some(queue));

    assert_eq!(store.pop_next(&id).await.unwrap(), Some(detail("B")));
    assert_eq!(store.status(&id).await.unwrap(), QueueStatus::Absent);
    assert_eq!(store.pop_next(&id).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires running Redis
async fn duplicate_create_keeps_first_record() {
    let store = test_store().await;
    let id = unique_id("exq-dup");
    let first = ExecutionQueue::new(&id).attribute("owner", "first");

    store.create_queue(&first).await.unwrap();
    store
        .create_queue(&ExecutionQueue::new(&id).attribute("owner", "second"))
        .await
        .unwrap();
    assert_eq!(store.get_queue(&id).await.unwrap(), Some(first));

    store.delete_queue(&id).await.unwrap();
    store.delete_queue(&id).await.unwrap();
    assert_eq!(store.status(&id).await.unwrap(), QueueStatus::Absent);
}
