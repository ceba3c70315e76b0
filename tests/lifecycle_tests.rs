//! Startup / shutdown lifecycle tests
//!
//! Memory backend state must survive a full shutdown + startup cycle
//! through the snapshot file.

use std::time::Duration;

use shortener::config::{StaticConfig, StorageConfig};
use shortener::runtime::lifetime::{shutdown, startup};
use shortener::storage::Shortlink;
use tempfile::TempDir;

fn memory_config(dir: &TempDir) -> StaticConfig {
    StaticConfig {
        storage: StorageConfig {
            snapshot_path: dir.path().join("data").join("links.json").display().to_string(),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_memory_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);

    let ctx = startup::prepare_startup(&config).await.unwrap();
    assert_eq!(ctx.repository.backend_name(), "memory");

    let created = ctx
        .service
        .create_one("user-1", 6, "https://example.com/persist")
        .await
        .unwrap()
        .into_link();
    let deleted = ctx
        .service
        .create_one("user-1", 6, "https://example.com/gone")
        .await
        .unwrap()
        .into_link();
    ctx.service
        .delete_many("user-1", vec![deleted.uid.clone()])
        .unwrap();
    ctx.processor.flush().await.unwrap();

    assert!(shutdown::shutdown(&ctx, Duration::from_secs(5)).await);
    assert!(dir.path().join("data").join("links.json").exists());

    let ctx = startup::prepare_startup(&config).await.unwrap();
    let restored = ctx.service.find_for_owner("user-1", &created.uid).await.unwrap();
    assert_eq!(restored, Some(created.clone()));

    // 软删除状态同样被保留
    let gone = ctx.service.resolve(&deleted.uid).await.unwrap().unwrap();
    assert!(gone.deleted);
    assert_eq!(ctx.service.list("user-1").await.unwrap().len(), 1);

    // 已有 long 仍然指向原来的 uid
    let again = ctx
        .service
        .create_one("user-2", 6, "https://example.com/persist")
        .await
        .unwrap();
    assert!(again.is_conflict());
    assert_eq!(again.link().uid, created.uid);

    assert!(shutdown::shutdown(&ctx, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_null_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);
    let path = dir.path().join("data");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("links.json"), "null").unwrap();

    let ctx = startup::prepare_startup(&config).await.unwrap();
    assert!(ctx.service.list("user-1").await.unwrap().is_empty());
    assert!(shutdown::shutdown(&ctx, Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_corrupt_snapshot_fails_startup_and_is_kept() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);
    let path = dir.path().join("data");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("links.json"), "[{\"uid\": ").unwrap();

    assert!(startup::prepare_startup(&config).await.is_err());
    let content = std::fs::read_to_string(path.join("links.json")).unwrap();
    assert_eq!(content, "[{\"uid\": ");
}

#[tokio::test]
async fn test_snapshot_file_is_a_json_array_of_records() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(&dir);

    let ctx = startup::prepare_startup(&config).await.unwrap();
    ctx.service
        .create_batch(
            "user-1",
            5,
            vec![shortener::services::BatchLinkRequest::new(
                "https://example.com/json",
                Some("corr-1".to_string()),
            )],
        )
        .await
        .unwrap();
    assert!(shutdown::shutdown(&ctx, Duration::from_secs(5)).await);

    let raw = std::fs::read_to_string(dir.path().join("data").join("links.json")).unwrap();
    let records: Vec<Shortlink> = serde_json::from_str(&raw).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].long, "https://example.com/json");
    assert_eq!(records[0].correlation_id.as_deref(), Some("corr-1"));
    assert!(!records[0].deleted);
}

#[tokio::test]
async fn test_disabled_snapshot_path_skips_backup() {
    let config = StaticConfig {
        storage: StorageConfig {
            snapshot_path: String::new(),
        },
        ..Default::default()
    };

    let ctx = startup::prepare_startup(&config).await.unwrap();
    ctx.service
        .create_one("user-1", 6, "https://example.com/ephemeral")
        .await
        .unwrap();
    assert!(shutdown::shutdown(&ctx, Duration::from_secs(5)).await);
}
