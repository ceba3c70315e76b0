//! CLI mode
//!
//! Runs a single command against a started engine, then performs the same
//! shutdown sequence as server mode so snapshots stay current.

use std::time::Duration;

use anyhow::Result;
use tracing::error;

use crate::cli::Commands;
use crate::config::StaticConfig;
use crate::interfaces::cli as commands;
use crate::runtime::lifetime::{AppContext, shutdown, startup};

pub async fn run_cli(command: Commands, config: &StaticConfig) -> Result<()> {
    let ctx = startup::prepare_startup(config).await?;

    let result = dispatch(&ctx, command).await;

    let timeout = Duration::from_secs(config.app.shutdown_timeout_secs);
    if !shutdown::shutdown(&ctx, timeout).await {
        error!("Shutdown after CLI command did not complete cleanly");
    }

    result.map_err(Into::into)
}

async fn dispatch(ctx: &AppContext, command: Commands) -> crate::errors::Result<()> {
    match command {
        Commands::Shorten { url, owner, length } => {
            commands::shorten(ctx, &owner, length, &url).await
        }
        Commands::ShortenBatch {
            file_path,
            owner,
            length,
        } => commands::shorten_batch(ctx, &owner, length, &file_path).await,
        Commands::Resolve { uid } => commands::resolve_link(ctx, &uid).await,
        Commands::List { owner } => commands::list_links(ctx, &owner).await,
        Commands::Delete { uids, owner } => commands::delete_links(ctx, &owner, uids).await,
        Commands::Ping => commands::ping(ctx).await,
        Commands::GenerateConfig { output_path, force } => {
            commands::generate_config(output_path, force)
        }
        // 由 main 直接路由到 run_server
        Commands::Serve => Ok(()),
    }
}
