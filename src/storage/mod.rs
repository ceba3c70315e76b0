use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::{DatabaseConfig, StorageConfig};
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod snapshot;

pub use backend::SeaOrmRepository;
pub use memory::InMemoryRepository;
pub use models::{SaveOutcome, Shortlink};
pub use snapshot::{FileSnapshotStore, NullSnapshotStore, SnapshotStore, open_snapshot_store};

/// 短链接持久化接口，内存后端与关系型后端共用
///
/// 两个后端遵守同样的不变量：uid 全局唯一，同一个 long 最多对应一条记录
/// （先写者胜），记录只会被软删除。
#[async_trait]
pub trait ShortlinkRepository: Send + Sync {
    fn backend_name(&self) -> &str;

    /// 保存一条链接；long 已存在时返回 `SaveOutcome::UrlConflict(已有记录)`
    async fn save(&self, link: Shortlink) -> Result<SaveOutcome>;

    /// 原子地保存一批链接，按输入顺序返回最终记录
    async fn save_batch(&self, links: Vec<Shortlink>) -> Result<Vec<Shortlink>>;

    /// owner_id 为空时在所有用户中查找（包含已删除记录），
    /// 否则只查找该用户未删除的记录
    async fn find(&self, owner_id: &str, uid: &str) -> Result<Option<Shortlink>>;

    /// 批量查询已存在的 uid（不区分用户）
    async fn find_many(&self, uids: &[String]) -> Result<Vec<Shortlink>>;

    async fn list(&self, owner_id: &str) -> Result<Vec<Shortlink>>;

    /// 软删除该用户名下的链接，返回实际被标记的条数
    async fn delete_many(&self, owner_id: &str, uids: &[String]) -> Result<u64>;

    async fn ping(&self) -> Result<()>;

    async fn backup(&self) -> Result<()>;

    /// 返回恢复的记录数
    async fn restore(&self) -> Result<usize>;

    async fn close(&self) -> Result<()>;
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// 根据配置选择后端
    ///
    /// database_url 为空时直接使用内存后端；关系型后端初始化失败时
    /// 记录错误并回退到内存后端。
    pub async fn create(
        database: &DatabaseConfig,
        storage: &StorageConfig,
    ) -> Result<Arc<dyn ShortlinkRepository>> {
        if database.database_url.trim().is_empty() {
            info!("No database URL configured, using in-memory repository");
            return Ok(Self::in_memory(storage));
        }

        match SeaOrmRepository::new(database).await {
            Ok(repository) => Ok(Arc::new(repository) as Arc<dyn ShortlinkRepository>),
            Err(e) => {
                error!("Failed to initialize relational repository: {}", e);
                warn!("Falling back to in-memory repository");
                Ok(Self::in_memory(storage))
            }
        }
    }

    fn in_memory(storage: &StorageConfig) -> Arc<dyn ShortlinkRepository> {
        let snapshot = open_snapshot_store(&storage.snapshot_path);
        Arc::new(InMemoryRepository::new(snapshot))
    }
}
