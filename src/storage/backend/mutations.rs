//! Write operations for SeaOrmRepository

use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, error, info};

use super::SeaOrmRepository;
use super::operations::insert_or_existing;
use super::retry;
use crate::errors::{Result, ShortenerError};
use crate::storage::{SaveOutcome, Shortlink};

use migration::entities::shortlink;

/// ON CONFLICT 只覆盖 long，剩下的唯一约束冲突只能来自 uid 主键
fn save_error(uid: &str, err: DbErr, action: &str) -> ShortenerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ShortenerError::uid_conflict(format!("uid 已存在: {}", uid))
        }
        _ => ShortenerError::database_operation(format!("{} '{}' 失败: {}", action, uid, err)),
    }
}

impl SeaOrmRepository {
    pub(super) async fn insert_link(&self, link: Shortlink) -> Result<SaveOutcome> {
        let db = &self.db;

        // 插入与读回在同一个事务内，出错时 txn 被 drop 即回滚
        let outcome = retry::with_retry(
            &format!("save({})", link.uid),
            self.retry_config,
            || async {
                let txn = db.begin().await?;
                let outcome = insert_or_existing(&txn, &link).await?;
                txn.commit().await?;
                Ok(outcome)
            },
        )
        .await
        .map_err(|e| save_error(&link.uid, e, "保存短链接"))?;

        if !outcome.is_conflict() {
            debug!("Shortlink saved: {}", link.uid);
        }
        Ok(outcome)
    }

    /// 整批在一个事务里写入，任何一条失败都回滚
    pub(super) async fn insert_links(&self, links: Vec<Shortlink>) -> Result<Vec<Shortlink>> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ShortenerError::database_operation(format!("开始事务失败: {}", e)))?;

        let mut result = Vec::with_capacity(links.len());
        let mut inserted = 0usize;
        for link in &links {
            match insert_or_existing(&txn, link).await {
                Ok(outcome) => {
                    if !outcome.is_conflict() {
                        inserted += 1;
                    }
                    result.push(outcome.into_link());
                }
                Err(e) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        error!("Rollback failed: {}", rollback_err);
                    }
                    return Err(save_error(&link.uid, e, "批量保存"));
                }
            }
        }

        txn.commit()
            .await
            .map_err(|e| ShortenerError::database_operation(format!("提交事务失败: {}", e)))?;

        info!(
            "Batch saved {} links ({} new)",
            result.len(),
            inserted
        );
        Ok(result)
    }

    /// `UPDATE shortlinks SET deleted = true WHERE owner_id = ? AND uid IN (...)`
    pub(super) async fn mark_deleted(&self, owner_id: &str, uids: &[String]) -> Result<u64> {
        if uids.is_empty() {
            return Ok(0);
        }

        let db = &self.db;
        let result = retry::with_retry(
            &format!("delete_many({})", owner_id),
            self.retry_config,
            || async {
                shortlink::Entity::update_many()
                    .col_expr(shortlink::Column::Deleted, Expr::val(true))
                    .filter(shortlink::Column::OwnerId.eq(owner_id))
                    .filter(shortlink::Column::Uid.is_in(uids.iter().cloned()))
                    .filter(shortlink::Column::Deleted.eq(false))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| ShortenerError::database_operation(format!("批量删除失败: {}", e)))?;

        info!(
            "Marked {} links deleted for owner {}",
            result.rows_affected, owner_id
        );
        Ok(result.rows_affected)
    }
}
