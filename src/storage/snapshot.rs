//! 内存后端的快照存储
//!
//! 快照是一个 JSON 数组，每个元素是一条完整的 `Shortlink` 记录。
//! 写入时先写 `<path>.tmp` 再 rename，避免崩溃时留下半个文件。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace, warn};

use crate::errors::{Result, ShortenerError};
use crate::storage::models::Shortlink;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 用给定的记录整体替换快照内容
    async fn backup(&self, links: &[Shortlink]) -> Result<()>;

    /// 读取快照；文件不存在或为空时返回空集合
    async fn restore(&self) -> Result<Vec<Shortlink>>;

    async fn close(&self) -> Result<()>;
}

/// 根据路径打开快照存储，空路径表示禁用快照
pub fn open_snapshot_store(path: &str) -> Arc<dyn SnapshotStore> {
    if path.trim().is_empty() {
        debug!("Snapshot path is empty, snapshots disabled");
        Arc::new(NullSnapshotStore)
    } else {
        Arc::new(FileSnapshotStore::new(path))
    }
}

pub struct FileSnapshotStore {
    path: PathBuf,
    tmp_path: PathBuf,
    closed: AtomicBool,
}

impl FileSnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");

        Self {
            path,
            tmp_path: PathBuf::from(tmp),
            closed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ShortenerError::file_operation(format!(
                    "创建快照目录失败 {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn backup(&self, links: &[Shortlink]) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ShortenerError::file_operation(format!(
                "快照存储已关闭: {}",
                self.path.display()
            )));
        }

        self.ensure_parent_dir().await?;
        let json = serde_json::to_vec_pretty(links)?;

        let mut file = tokio::fs::File::create(&self.tmp_path).await.map_err(|e| {
            ShortenerError::file_operation(format!(
                "创建临时快照文件失败 {}: {}",
                self.tmp_path.display(),
                e
            ))
        })?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|e| {
                ShortenerError::file_operation(format!(
                    "替换快照文件失败 {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        info!(
            "Snapshot written: {} links -> {}",
            links.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn restore(&self) -> Result<Vec<Shortlink>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Snapshot file {} not found, starting empty",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ShortenerError::file_operation(format!(
                    "读取快照文件失败 {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.iter().all(|b| b.is_ascii_whitespace()) {
            warn!("Snapshot file {} is empty", self.path.display());
            return Ok(Vec::new());
        }

        // 零条记录的快照可能被写成 `null`
        let links: Option<Vec<Shortlink>> = serde_json::from_slice(&content).map_err(|e| {
            ShortenerError::serialization(format!(
                "解析快照文件失败 {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let links = links.unwrap_or_default();

        info!(
            "Snapshot loaded: {} links from {}",
            links.len(),
            self.path.display()
        );
        Ok(links)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Snapshot store {} closed", self.path.display());
        }
        Ok(())
    }
}

/// 禁用快照时使用，所有操作都是空操作
pub struct NullSnapshotStore;

#[async_trait]
impl SnapshotStore for NullSnapshotStore {
    async fn backup(&self, links: &[Shortlink]) -> Result<()> {
        trace!("NullSnapshotStore.backup called with {} links", links.len());
        Ok(())
    }

    async fn restore(&self) -> Result<Vec<Shortlink>> {
        trace!("NullSnapshotStore.restore called");
        Ok(Vec::new())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn link(uid: &str, owner: &str) -> Shortlink {
        Shortlink::new(
            uid,
            owner,
            format!("http://localhost:8080/{}", uid),
            format!("https://example.com/{}", uid),
        )
    }

    #[tokio::test]
    async fn test_restore_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("missing.json"));
        assert!(store.restore().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_empty_and_null_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");

        std::fs::write(&path, "").unwrap();
        let store = FileSnapshotStore::new(&path);
        assert!(store.restore().await.unwrap().is_empty());

        std::fs::write(&path, "null").unwrap();
        assert!(store.restore().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backup_then_restore() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested").join("snap.json"));

        let mut deleted = link("b", "o2");
        deleted.deleted = true;
        let links = vec![link("a", "o1"), deleted];

        store.backup(&links).await.unwrap();
        let restored = store.restore().await.unwrap();
        assert_eq!(restored, links);
        assert!(!dir.path().join("nested").join("snap.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_backup_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snap.json"));

        store.backup(&[link("a", "o"), link("b", "o")]).await.unwrap();
        store.backup(&[link("c", "o")]).await.unwrap();

        let restored = store.restore().await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].uid, "c");
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSnapshotStore::new(&path);
        let err = store.restore().await.unwrap_err();
        assert!(matches!(err, ShortenerError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_backup_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("snap.json"));
        store.close().await.unwrap();

        let err = store.backup(&[link("a", "o")]).await.unwrap_err();
        assert!(matches!(err, ShortenerError::FileOperation(_)));
    }

    #[tokio::test]
    async fn test_empty_path_uses_null_store() {
        let store = open_snapshot_store("  ");
        store.backup(&[link("a", "o")]).await.unwrap();
        assert!(store.restore().await.unwrap().is_empty());
    }
}
