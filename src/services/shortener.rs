//! 短链接服务
//!
//! 负责 URL 校验、短码生成与冲突重试、单条/批量创建，以及
//! 查询、列表、删除和健康检查的转发。

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::batch::DeleteQueue;
use crate::config::ShortenerConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::{SaveOutcome, Shortlink, ShortlinkRepository};
use crate::utils::{CodeGenerator, validate_long_url};

/// 生成短码时最多尝试的次数（批量创建时为轮数）
pub const MAX_GENERATION_ATTEMPTS: usize = 3;

/// 批量创建中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLinkRequest {
    pub url: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl BatchLinkRequest {
    pub fn new(url: impl Into<String>, correlation_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            correlation_id,
        }
    }
}

pub struct ShortenerService {
    repository: Arc<dyn ShortlinkRepository>,
    deletes: Arc<dyn DeleteQueue>,
    generator: CodeGenerator,
    config: ShortenerConfig,
}

impl ShortenerService {
    pub fn new(
        repository: Arc<dyn ShortlinkRepository>,
        deletes: Arc<dyn DeleteQueue>,
        config: ShortenerConfig,
    ) -> Self {
        Self {
            repository,
            deletes,
            generator: CodeGenerator::new(),
            config,
        }
    }

    pub fn with_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn repository(&self) -> &Arc<dyn ShortlinkRepository> {
        &self.repository
    }

    /// 创建单条短链接
    ///
    /// 长链接已存在时返回 `SaveOutcome::UrlConflict`，其中是已有记录。
    /// 并发请求可能在检查之后抢先写入同一个 uid，此时保存返回
    /// `UidConflict`，同样计入重试次数。
    pub async fn create_one(&self, owner_id: &str, length: i32, long_url: &str) -> Result<SaveOutcome> {
        require_owner(owner_id)?;
        validate_long_url(long_url)?;

        let length = self.effective_length(length);
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let uid = self.generator.generate(length);
            // 不带 owner 的查找覆盖所有用户，uid 全局唯一
            if self.repository.find("", &uid).await?.is_some() {
                debug!(
                    "Generated uid {} already exists (attempt {}/{})",
                    uid, attempt, MAX_GENERATION_ATTEMPTS
                );
                continue;
            }

            let link = Shortlink::new(uid.clone(), owner_id, self.short_url(&uid), long_url);
            match self.repository.save(link).await {
                Ok(SaveOutcome::Inserted(link)) => {
                    info!("Shortlink created: {} -> {}", link.uid, link.long);
                    return Ok(SaveOutcome::Inserted(link));
                }
                Ok(SaveOutcome::UrlConflict(link)) => {
                    debug!("Long URL already shortened as {}", link.uid);
                    return Ok(SaveOutcome::UrlConflict(link));
                }
                Err(ShortenerError::UidConflict(_)) => {
                    debug!(
                        "Uid {} taken concurrently (attempt {}/{})",
                        uid, attempt, MAX_GENERATION_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(ShortenerError::uid_conflict(format!(
            "{} 次生成的短码均已存在 (length: {})",
            MAX_GENERATION_ATTEMPTS, length
        )))
    }

    /// 批量创建短链接
    ///
    /// 先校验全部 URL（遇到第一个非法 URL 即失败），再为每一项分配唯一
    /// 短码，最后整批原子写入。结果顺序与输入一致，并带回各项提交的
    /// correlation_id。整批写入时遇到 uid 冲突会回滚，整批重新分配。
    pub async fn create_batch(
        &self,
        owner_id: &str,
        length: i32,
        items: Vec<BatchLinkRequest>,
    ) -> Result<Vec<Shortlink>> {
        require_owner(owner_id)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        for item in &items {
            validate_long_url(&item.url)?;
        }

        let length = self.effective_length(length);
        let mut uids = vec![String::new(); items.len()];
        let mut pending: Vec<usize> = (0..items.len()).collect();

        for round in 1..=MAX_GENERATION_ATTEMPTS {
            for &idx in &pending {
                uids[idx] = self.generator.generate(length);
            }

            let colliding = self.colliding_uids(&uids, &pending).await?;
            if !colliding.is_empty() {
                debug!(
                    "Batch uid round {}/{}: {} collisions",
                    round,
                    MAX_GENERATION_ATTEMPTS,
                    colliding.len()
                );
                pending = colliding;
                continue;
            }

            let links: Vec<Shortlink> = items
                .iter()
                .zip(&uids)
                .map(|(item, uid)| {
                    Shortlink::new(uid.clone(), owner_id, self.short_url(uid), item.url.clone())
                        .with_correlation_id(item.correlation_id.clone())
                })
                .collect();

            match self.repository.save_batch(links).await {
                Ok(saved) => return self.finish_batch(owner_id, saved, items),
                Err(ShortenerError::UidConflict(e)) => {
                    debug!(
                        "Batch uid round {}/{}: taken concurrently ({})",
                        round, MAX_GENERATION_ATTEMPTS, e
                    );
                    pending = (0..items.len()).collect();
                }
                Err(e) => return Err(e),
            }
        }

        Err(ShortenerError::uid_conflict(format!(
            "{} 轮生成后仍有短码冲突 (batch size: {}, length: {})",
            MAX_GENERATION_ATTEMPTS,
            items.len(),
            length
        )))
    }

    /// 不区分用户的查找，已删除的记录也会返回（`deleted = true`）
    pub async fn resolve(&self, uid: &str) -> Result<Option<Shortlink>> {
        self.repository.find("", uid).await
    }

    pub async fn find_for_owner(&self, owner_id: &str, uid: &str) -> Result<Option<Shortlink>> {
        require_owner(owner_id)?;
        self.repository.find(owner_id, uid).await
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<Shortlink>> {
        require_owner(owner_id)?;
        self.repository.list(owner_id).await
    }

    /// 仅入队，立即返回；实际软删除由批量删除处理器完成
    pub fn delete_many(&self, owner_id: &str, uids: Vec<String>) -> Result<()> {
        require_owner(owner_id)?;
        if uids.is_empty() {
            return Ok(());
        }
        debug!("Queued {} deletes for {}", uids.len(), owner_id);
        self.deletes.enqueue(owner_id, uids)
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await.map_err(|e| {
            warn!("{} backend ping failed: {}", self.repository.backend_name(), e);
            ShortenerError::backend_unavailable(e.message().to_string())
        })
    }

    pub fn short_url(&self, uid: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), uid)
    }

    fn effective_length(&self, length: i32) -> usize {
        if length <= 0 {
            self.config.default_length.max(1)
        } else {
            length as usize
        }
    }

    /// 返回 `pending` 中需要重新生成的下标：库中已存在，或与批内其他项重复
    async fn colliding_uids(&self, uids: &[String], pending: &[usize]) -> Result<Vec<usize>> {
        let candidates: Vec<String> = pending.iter().map(|&idx| uids[idx].clone()).collect();
        let taken: HashSet<String> = self
            .repository
            .find_many(&candidates)
            .await?
            .into_iter()
            .map(|link| link.uid)
            .collect();

        let mut seen: HashSet<&str> = HashSet::with_capacity(uids.len());
        Ok(uids
            .iter()
            .enumerate()
            .filter(|&(_, uid)| taken.contains(uid) || !seen.insert(uid.as_str()))
            .map(|(idx, _)| idx)
            .collect())
    }

    fn finish_batch(
        &self,
        owner_id: &str,
        saved: Vec<Shortlink>,
        items: Vec<BatchLinkRequest>,
    ) -> Result<Vec<Shortlink>> {
        if saved.len() != items.len() {
            return Err(ShortenerError::database_operation(format!(
                "批量保存返回 {} 条记录，期望 {} 条",
                saved.len(),
                items.len()
            )));
        }

        info!("Batch created {} shortlinks for {}", saved.len(), owner_id);
        Ok(saved
            .into_iter()
            .zip(items)
            .map(|(link, item)| link.with_correlation_id(item.correlation_id))
            .collect())
    }
}

fn require_owner(owner_id: &str) -> Result<()> {
    if owner_id.is_empty() {
        return Err(ShortenerError::validation("owner id must not be empty"));
    }
    Ok(())
}
