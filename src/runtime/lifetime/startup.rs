use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::batch::BatchDeleteProcessor;
use crate::config::StaticConfig;
use crate::services::ShortenerService;
use crate::storage::{RepositoryFactory, ShortlinkRepository};

/// 启动后各组件的句柄
pub struct AppContext {
    pub repository: Arc<dyn ShortlinkRepository>,
    pub processor: Arc<BatchDeleteProcessor>,
    pub service: Arc<ShortenerService>,
}

/// 按依赖顺序启动：存储后端 -> 恢复快照 -> 批量删除处理器 -> 服务
pub async fn prepare_startup(config: &StaticConfig) -> Result<AppContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let repository = RepositoryFactory::create(&config.database, &config.storage)
        .await
        .context("Failed to create repository")?;
    info!("Using repository backend: {}", repository.backend_name());

    // 快照损坏时直接失败，否则关闭时的备份会覆盖掉它
    let restored = repository
        .restore()
        .await
        .context("Failed to restore repository state")?;
    if restored > 0 {
        info!("Restored {} links from snapshot", restored);
    }

    let processor = Arc::new(BatchDeleteProcessor::start(
        repository.clone(),
        &config.batch,
    ));

    let service = Arc::new(ShortenerService::new(
        repository.clone(),
        processor.clone(),
        config.shortener.clone(),
    ));

    info!(
        "Startup completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(AppContext {
        repository,
        processor,
        service,
    })
}
