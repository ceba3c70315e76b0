//! SeaORM storage backend
//!
//! Durable repository over SQLite or PostgreSQL. The `shortlinks` table
//! has `uid` as primary key and a unique index on `long`.

mod connection;
mod converters;
mod mutations;
mod operations;
mod query;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::{SaveOutcome, Shortlink, ShortlinkRepository};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_shortlink, shortlink_to_active_model};
pub use operations::insert_or_existing;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ShortenerError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, postgres://",
            database_url
        )))
    }
}

pub struct SeaOrmRepository {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
    ping_timeout: Duration,
}

impl SeaOrmRepository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.trim();
        if database_url.is_empty() {
            return Err(ShortenerError::database_config("database_url 未设置"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url, config).await?
        } else {
            connect_generic(database_url, &backend_name, config).await?
        };

        run_migrations(&db).await?;

        info!("{} repository initialized", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name,
            retry_config: retry::RetryConfig::from(config),
            ping_timeout: Duration::from_millis(config.ping_timeout_ms),
        })
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ShortlinkRepository for SeaOrmRepository {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn save(&self, link: Shortlink) -> Result<SaveOutcome> {
        self.insert_link(link).await
    }

    async fn save_batch(&self, links: Vec<Shortlink>) -> Result<Vec<Shortlink>> {
        self.insert_links(links).await
    }

    async fn find(&self, owner_id: &str, uid: &str) -> Result<Option<Shortlink>> {
        self.get_link(owner_id, uid).await
    }

    async fn find_many(&self, uids: &[String]) -> Result<Vec<Shortlink>> {
        self.get_links(uids).await
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Shortlink>> {
        self.owner_links(owner_id).await
    }

    async fn delete_many(&self, owner_id: &str, uids: &[String]) -> Result<u64> {
        self.mark_deleted(owner_id, uids).await
    }

    async fn ping(&self) -> Result<()> {
        self.check_alive(self.ping_timeout).await
    }

    // 数据本身已持久化，无需快照
    async fn backup(&self) -> Result<()> {
        debug!("{} repository: backup is a no-op", self.backend_name);
        Ok(())
    }

    async fn restore(&self) -> Result<usize> {
        debug!("{} repository: restore is a no-op", self.backend_name);
        Ok(0)
    }

    async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(|e| {
            ShortenerError::database_connection(format!("关闭数据库连接失败: {}", e))
        })?;
        info!("{} repository closed", self.backend_name.to_uppercase());
        Ok(())
    }
}
