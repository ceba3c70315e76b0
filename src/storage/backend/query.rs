//! Read operations for SeaOrmRepository

use std::time::Duration;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::converters::model_to_shortlink;
use super::{SeaOrmRepository, retry};
use crate::errors::{Result, ShortenerError};
use crate::storage::Shortlink;

use migration::entities::shortlink;

impl SeaOrmRepository {
    pub(super) async fn get_link(&self, owner_id: &str, uid: &str) -> Result<Option<Shortlink>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("find({})", uid), self.retry_config, || async {
            if owner_id.is_empty() {
                shortlink::Entity::find_by_id(uid.to_string()).one(db).await
            } else {
                shortlink::Entity::find()
                    .filter(shortlink::Column::Uid.eq(uid))
                    .filter(shortlink::Column::OwnerId.eq(owner_id))
                    .filter(shortlink::Column::Deleted.eq(false))
                    .one(db)
                    .await
            }
        })
        .await
        .map_err(|e| ShortenerError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_shortlink))
    }

    pub(super) async fn get_links(&self, uids: &[String]) -> Result<Vec<Shortlink>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let db = &self.db;
        let models = retry::with_retry("find_many", self.retry_config, || async {
            shortlink::Entity::find()
                .filter(shortlink::Column::Uid.is_in(uids.iter().cloned()))
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShortenerError::database_operation(format!("批量查询短链接失败: {}", e)))?;

        debug!("find_many: {}/{} uids exist", models.len(), uids.len());
        Ok(models.into_iter().map(model_to_shortlink).collect())
    }

    pub(super) async fn owner_links(&self, owner_id: &str) -> Result<Vec<Shortlink>> {
        let db = &self.db;

        let models = retry::with_retry(&format!("list({})", owner_id), self.retry_config, || async {
            shortlink::Entity::find()
                .filter(shortlink::Column::OwnerId.eq(owner_id))
                .filter(shortlink::Column::Deleted.eq(false))
                .order_by_asc(shortlink::Column::Uid)
                .all(db)
                .await
        })
        .await
        .map_err(|e| ShortenerError::database_operation(format!("列出短链接失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_shortlink).collect())
    }

    /// 带超时的连通性检查
    pub(super) async fn check_alive(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.db.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ShortenerError::database_connection(format!(
                "{} ping 失败: {}",
                self.backend_name.to_uppercase(),
                e
            ))),
            Err(_) => Err(ShortenerError::database_connection(format!(
                "{} ping 超时 ({} ms)",
                self.backend_name.to_uppercase(),
                timeout.as_millis()
            ))),
        }
    }
}
