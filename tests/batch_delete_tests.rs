//! Batch delete processor tests

use std::sync::Arc;
use std::time::Duration;

use shortener::batch::{BatchDeleteProcessor, DeleteQueue};
use shortener::config::BatchConfig;
use shortener::errors::ShortenerError;
use shortener::storage::{InMemoryRepository, NullSnapshotStore, Shortlink, ShortlinkRepository};

async fn seeded_repository(owner: &str, uids: &[&str]) -> Arc<InMemoryRepository> {
    let repository = Arc::new(InMemoryRepository::new(Arc::new(NullSnapshotStore)));
    for uid in uids {
        repository
            .save(Shortlink::new(
                *uid,
                owner,
                format!("http://s.io/{}", uid),
                format!("https://example.com/{}", uid),
            ))
            .await
            .unwrap();
    }
    repository
}

fn config(interval_ms: u64, flush_on_shutdown: bool) -> BatchConfig {
    BatchConfig {
        delete_flush_interval_ms: interval_ms,
        flush_on_shutdown,
    }
}

fn uids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_enqueue_is_not_applied_until_flush() {
    let repository = seeded_repository("user-1", &["a", "b", "c"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, false));

    processor.enqueue("user-1", uids(&["a", "b"])).unwrap();
    assert_eq!(repository.list("user-1").await.unwrap().len(), 3);

    assert_eq!(processor.flush().await.unwrap(), 2);
    let remaining = repository.list("user-1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].uid, "c");

    processor.stop().await;
}

#[tokio::test]
async fn test_duplicate_and_repeated_requests_counted_once() {
    let repository = seeded_repository("user-1", &["a", "b"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, false));

    processor.enqueue("user-1", uids(&["a", "a"])).unwrap();
    processor.enqueue("user-1", uids(&["a", "missing"])).unwrap();
    assert_eq!(processor.flush().await.unwrap(), 1);

    processor.enqueue("user-1", uids(&["a"])).unwrap();
    assert_eq!(processor.flush().await.unwrap(), 0);

    processor.stop().await;
}

#[tokio::test]
async fn test_requests_are_grouped_by_owner() {
    let repository = seeded_repository("user-1", &["a"]).await;
    repository
        .save(Shortlink::new(
            "b",
            "user-2",
            "http://s.io/b",
            "https://example.com/b",
        ))
        .await
        .unwrap();
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, false));

    // user-2 不能删除 user-1 的链接
    processor.enqueue("user-2", uids(&["a", "b"])).unwrap();
    assert_eq!(processor.flush().await.unwrap(), 1);

    assert_eq!(repository.list("user-1").await.unwrap().len(), 1);
    assert!(repository.list("user-2").await.unwrap().is_empty());

    processor.stop().await;
}

#[tokio::test]
async fn test_interval_flushes_automatically() {
    let repository = seeded_repository("user-1", &["a"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(20, false));

    processor.enqueue("user-1", uids(&["a"])).unwrap();

    let mut deleted = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if repository.list("user-1").await.unwrap().is_empty() {
            deleted = true;
            break;
        }
    }
    assert!(deleted, "pending delete was never flushed");

    processor.stop().await;
}

#[tokio::test]
async fn test_stop_with_flush_on_shutdown_applies_pending() {
    let repository = seeded_repository("user-1", &["a", "b"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, true));

    processor.enqueue("user-1", uids(&["a", "b"])).unwrap();
    processor.stop().await;

    assert!(repository.list("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stop_without_flush_on_shutdown_discards_pending() {
    let repository = seeded_repository("user-1", &["a", "b"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, false));

    processor.enqueue("user-1", uids(&["a"])).unwrap();
    processor.stop().await;

    assert_eq!(repository.list("user-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_operations_after_stop_fail() {
    let repository = seeded_repository("user-1", &["a"]).await;
    let processor = BatchDeleteProcessor::start(repository.clone(), &config(60_000, false));
    processor.stop().await;

    let err = processor.enqueue("user-1", uids(&["a"])).unwrap_err();
    assert!(matches!(err, ShortenerError::BackendUnavailable(_)));

    let err = processor.flush().await.unwrap_err();
    assert!(matches!(err, ShortenerError::BackendUnavailable(_)));

    // 重复 stop 不会 panic
    processor.stop().await;
}

#[tokio::test]
async fn test_usable_through_delete_queue_trait() {
    let repository = seeded_repository("user-1", &["a"]).await;
    let processor = Arc::new(BatchDeleteProcessor::start(
        repository.clone(),
        &config(60_000, true),
    ));

    let queue: Arc<dyn DeleteQueue> = processor.clone();
    queue.enqueue("user-1", uids(&["a"])).unwrap();
    // 空请求直接忽略
    queue.enqueue("user-1", Vec::new()).unwrap();

    assert_eq!(processor.flush().await.unwrap(), 1);
    processor.stop().await;
}
