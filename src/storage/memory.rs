//! 内存后端
//!
//! 数据按 owner_id -> uid -> Shortlink 两级存放，另外维护 uid 和 long
//! 两个索引，全部由同一把读写锁保护。进程退出前通过快照存储落盘。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::ShortlinkRepository;
use super::models::{SaveOutcome, Shortlink};
use super::snapshot::SnapshotStore;
use crate::errors::{Result, ShortenerError};

#[derive(Default)]
struct MemoryState {
    links: HashMap<String, HashMap<String, Shortlink>>,
    /// uid -> owner_id
    owner_by_uid: HashMap<String, String>,
    /// long -> uid
    uid_by_long: HashMap<String, String>,
}

impl MemoryState {
    fn get(&self, uid: &str) -> Option<&Shortlink> {
        let owner = self.owner_by_uid.get(uid)?;
        self.links.get(owner)?.get(uid)
    }

    fn get_by_long(&self, long: &str) -> Option<&Shortlink> {
        self.uid_by_long.get(long).and_then(|uid| self.get(uid))
    }

    fn insert(&mut self, link: Shortlink) {
        self.owner_by_uid
            .insert(link.uid.clone(), link.owner_id.clone());
        self.uid_by_long.insert(link.long.clone(), link.uid.clone());
        self.links
            .entry(link.owner_id.clone())
            .or_default()
            .insert(link.uid.clone(), link);
    }

    fn len(&self) -> usize {
        self.owner_by_uid.len()
    }
}

pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
    snapshot: Arc<dyn SnapshotStore>,
}

impl InMemoryRepository {
    pub fn new(snapshot: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            snapshot,
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn duplicate_uid(uid: &str) -> ShortenerError {
        ShortenerError::uid_conflict(format!("uid 已存在: {}", uid))
    }
}

#[async_trait]
impl ShortlinkRepository for InMemoryRepository {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn save(&self, link: Shortlink) -> Result<SaveOutcome> {
        let mut state = self.state.write();

        if let Some(existing) = state.get_by_long(&link.long) {
            debug!(
                "Long URL already shortened as {}, returning existing link",
                existing.uid
            );
            return Ok(SaveOutcome::UrlConflict(existing.clone()));
        }
        if state.owner_by_uid.contains_key(&link.uid) {
            return Err(Self::duplicate_uid(&link.uid));
        }

        state.insert(link.clone());
        Ok(SaveOutcome::Inserted(link))
    }

    async fn save_batch(&self, links: Vec<Shortlink>) -> Result<Vec<Shortlink>> {
        let mut state = self.state.write();

        // 先在锁内完整校验，任何一条失败都不写入
        let mut staged_uids: HashSet<&str> = HashSet::new();
        let mut staged_longs: HashMap<&str, usize> = HashMap::new();
        let mut resolved: Vec<Option<usize>> = Vec::with_capacity(links.len());

        for (idx, link) in links.iter().enumerate() {
            if state.uid_by_long.contains_key(&link.long) {
                resolved.push(None);
                continue;
            }
            if let Some(&first) = staged_longs.get(link.long.as_str()) {
                resolved.push(Some(first));
                continue;
            }
            if state.owner_by_uid.contains_key(&link.uid) || !staged_uids.insert(link.uid.as_str()) {
                return Err(Self::duplicate_uid(&link.uid));
            }
            staged_longs.insert(link.long.as_str(), idx);
            resolved.push(Some(idx));
        }

        let mut result = Vec::with_capacity(links.len());
        for (link, slot) in links.iter().zip(&resolved) {
            match slot {
                Some(idx) => result.push(links[*idx].clone()),
                None => {
                    let existing = state
                        .get_by_long(&link.long)
                        .cloned()
                        .ok_or_else(|| {
                            ShortenerError::database_operation(format!(
                                "long 索引不一致: {}",
                                link.long
                            ))
                        })?;
                    result.push(existing);
                }
            }
        }

        let mut inserted = 0usize;
        for (idx, link) in links.into_iter().enumerate() {
            if resolved[idx] == Some(idx) {
                state.insert(link);
                inserted += 1;
            }
        }

        debug!(
            "Batch saved: {} inserted, {} already existed",
            inserted,
            result.len() - inserted
        );
        Ok(result)
    }

    async fn find(&self, owner_id: &str, uid: &str) -> Result<Option<Shortlink>> {
        let state = self.state.read();

        if owner_id.is_empty() {
            return Ok(state.get(uid).cloned());
        }

        Ok(state
            .links
            .get(owner_id)
            .and_then(|owned| owned.get(uid))
            .filter(|link| !link.deleted)
            .cloned())
    }

    async fn find_many(&self, uids: &[String]) -> Result<Vec<Shortlink>> {
        let state = self.state.read();
        let mut seen = HashSet::new();

        Ok(uids
            .iter()
            .filter(|uid| seen.insert(uid.as_str()))
            .filter_map(|uid| state.get(uid).cloned())
            .collect())
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<Shortlink>> {
        let state = self.state.read();

        let mut links: Vec<Shortlink> = state
            .links
            .get(owner_id)
            .map(|owned| {
                owned
                    .values()
                    .filter(|link| !link.deleted)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        links.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(links)
    }

    async fn delete_many(&self, owner_id: &str, uids: &[String]) -> Result<u64> {
        let mut state = self.state.write();
        let Some(owned) = state.links.get_mut(owner_id) else {
            return Ok(0);
        };

        let mut affected = 0u64;
        for uid in uids {
            if let Some(link) = owned.get_mut(uid)
                && !link.deleted
            {
                link.deleted = true;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn backup(&self) -> Result<()> {
        // 先复制出来再释放锁，写文件期间不阻塞读写
        let links: Vec<Shortlink> = {
            let state = self.state.read();
            let mut links: Vec<Shortlink> = state
                .links
                .values()
                .flat_map(|owned| owned.values().cloned())
                .collect();
            links.sort_by(|a, b| a.uid.cmp(&b.uid));
            links
        };

        self.snapshot.backup(&links).await
    }

    async fn restore(&self) -> Result<usize> {
        let links = self.snapshot.restore().await?;
        let count = links.len();

        {
            let mut state = self.state.write();
            for link in links {
                state.insert(link);
            }
        }

        info!("Restored {} links into memory repository", count);
        Ok(count)
    }

    async fn close(&self) -> Result<()> {
        self.snapshot.close().await
    }
}
