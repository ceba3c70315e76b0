use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::AppContext;

/// 单个关闭步骤的超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// 停止处理器、备份、关闭存储后端，整体受 `shutdown_timeout` 限制
///
/// 返回 false 表示超时或有步骤失败。
pub async fn shutdown(ctx: &AppContext, shutdown_timeout: Duration) -> bool {
    match timeout(shutdown_timeout, perform_shutdown_tasks(ctx)).await {
        Ok(ok) => {
            if ok {
                info!("All shutdown tasks completed successfully");
            }
            ok
        }
        Err(_) => {
            error!(
                "Shutdown tasks timed out after {} seconds",
                shutdown_timeout.as_secs()
            );
            false
        }
    }
}

async fn perform_shutdown_tasks(ctx: &AppContext) -> bool {
    let task_timeout = Duration::from_secs(TASK_TIMEOUT_SECS);
    let mut ok = true;

    if timeout(task_timeout, ctx.processor.stop()).await.is_err() {
        error!(
            "Batch delete processor stop timed out after {} seconds",
            TASK_TIMEOUT_SECS
        );
        ok = false;
    }

    match ctx.repository.backup().await {
        Ok(()) => info!("{} repository backed up", ctx.repository.backend_name()),
        Err(e) => {
            error!("Failed to back up repository: {}", e);
            ok = false;
        }
    }

    if let Err(e) = ctx.repository.close().await {
        error!("Failed to close repository: {}", e);
        ok = false;
    }

    ok
}
