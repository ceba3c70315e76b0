use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::config::StaticConfig;
use crate::runtime::lifetime::{shutdown, startup};

/// Run the engine until a shutdown signal arrives
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let ctx = startup::prepare_startup(config).await?;

    if let Err(e) = ctx.service.ping().await {
        warn!("Initial health check failed: {}", e);
    }
    info!(
        "Shortener engine running on {} backend, press Ctrl+C to stop",
        ctx.repository.backend_name()
    );

    shutdown::wait_for_signal().await;

    let timeout = Duration::from_secs(config.app.shutdown_timeout_secs);
    if !shutdown::shutdown(&ctx, timeout).await {
        bail!("graceful shutdown did not complete");
    }
    warn!("Graceful shutdown: all tasks completed");
    Ok(())
}
