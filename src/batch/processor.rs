use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::DeleteQueue;
use crate::config::BatchConfig;
use crate::errors::{Result, ShortenerError};
use crate::storage::ShortlinkRepository;

enum DeleteCommand {
    Enqueue { owner_id: String, uids: Vec<String> },
    /// 立即刷盘，完成后回传本次软删除的条数
    Flush(oneshot::Sender<u64>),
}

/// 批量删除处理器
///
/// 单个后台任务独占缓冲区 `owner_id -> [uid]`，按间隔调用
/// `delete_many`。刷盘失败只记录日志，对应的请求会被丢弃。
pub struct BatchDeleteProcessor {
    tx: mpsc::UnboundedSender<DeleteCommand>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BatchDeleteProcessor {
    /// 启动后台任务（必须在 tokio runtime 内调用）
    pub fn start(repository: Arc<dyn ShortlinkRepository>, config: &BatchConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let interval = Duration::from_millis(config.delete_flush_interval_ms.max(1));

        let worker = DeleteWorker {
            repository,
            pending: HashMap::new(),
            rx,
            flush_on_shutdown: config.flush_on_shutdown,
        };
        let handle = tokio::spawn(worker.run(interval, shutdown_rx));

        debug!(
            "Batch delete processor started (interval: {:?}, flush_on_shutdown: {})",
            interval, config.flush_on_shutdown
        );

        Self {
            tx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn enqueue(&self, owner_id: &str, uids: Vec<String>) -> Result<()> {
        if uids.is_empty() {
            return Ok(());
        }

        self.tx
            .send(DeleteCommand::Enqueue {
                owner_id: owner_id.to_string(),
                uids,
            })
            .map_err(|_| Self::stopped())
    }

    /// 立即刷盘并等待完成，返回软删除的条数
    pub async fn flush(&self) -> Result<u64> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(DeleteCommand::Flush(reply_tx))
            .map_err(|_| Self::stopped())?;
        reply_rx.await.map_err(|_| Self::stopped())
    }

    /// 停止后台任务并等待其退出
    pub async fn stop(&self) {
        let shutdown_tx = self.shutdown_tx.lock().take();
        if let Some(tx) = shutdown_tx {
            let _ = tx.send(());
        }

        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!("Batch delete processor task failed: {}", e);
        }
    }

    fn stopped() -> ShortenerError {
        ShortenerError::backend_unavailable("batch delete processor is stopped")
    }
}

impl DeleteQueue for BatchDeleteProcessor {
    fn enqueue(&self, owner_id: &str, uids: Vec<String>) -> Result<()> {
        BatchDeleteProcessor::enqueue(self, owner_id, uids)
    }
}

struct DeleteWorker {
    repository: Arc<dyn ShortlinkRepository>,
    pending: HashMap<String, Vec<String>>,
    rx: mpsc::UnboundedReceiver<DeleteCommand>,
    flush_on_shutdown: bool,
}

impl DeleteWorker {
    async fn run(mut self, interval: Duration, mut shutdown_rx: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即完成
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd).await,
                    None => break,
                },
                _ = ticker.tick() => {
                    self.flush().await;
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle(&mut self, cmd: DeleteCommand) {
        match cmd {
            DeleteCommand::Enqueue { owner_id, uids } => {
                self.pending.entry(owner_id).or_default().extend(uids);
            }
            DeleteCommand::Flush(reply) => {
                let affected = self.flush().await;
                let _ = reply.send(affected);
            }
        }
    }

    async fn flush(&mut self) -> u64 {
        if self.pending.is_empty() {
            return 0;
        }

        let batch = std::mem::take(&mut self.pending);
        let mut affected = 0u64;

        for (owner_id, mut uids) in batch {
            if uids.is_empty() {
                continue;
            }
            uids.sort_unstable();
            uids.dedup();

            match self.repository.delete_many(&owner_id, &uids).await {
                Ok(n) => {
                    debug!(
                        "Deleted {}/{} links for owner {}",
                        n,
                        uids.len(),
                        owner_id
                    );
                    affected += n;
                }
                Err(e) => {
                    error!(
                        "Failed to delete {} links for owner {}: {}",
                        uids.len(),
                        owner_id,
                        e
                    );
                }
            }
        }

        affected
    }

    async fn shutdown(&mut self) {
        // 关闭通道后仍可取出已经入队的请求
        self.rx.close();
        while let Ok(cmd) = self.rx.try_recv() {
            self.handle(cmd).await;
        }

        if self.flush_on_shutdown {
            let affected = self.flush().await;
            info!(
                "Batch delete processor stopped after final flush ({} deleted)",
                affected
            );
        } else {
            let dropped: usize = self.pending.values().map(Vec::len).sum();
            if dropped > 0 {
                warn!(
                    "Batch delete processor stopped, {} pending deletes discarded",
                    dropped
                );
            } else {
                info!("Batch delete processor stopped");
            }
        }
    }
}
