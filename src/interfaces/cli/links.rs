//! Link commands

use colored::Colorize;

use crate::errors::{Result, ShortenerError};
use crate::runtime::lifetime::AppContext;
use crate::services::BatchLinkRequest;
use crate::storage::{SaveOutcome, Shortlink};

fn print_link(link: &Shortlink) {
    let mut parts = vec![format!(
        "{} -> {}",
        link.short.cyan(),
        link.long.blue().underline()
    )];
    if let Some(correlation_id) = &link.correlation_id {
        parts.push(format!("[{}]", correlation_id).dimmed().to_string());
    }
    if link.deleted {
        parts.push("(deleted)".red().to_string());
    }
    println!("  {}", parts.join(" "));
}

pub async fn shorten(ctx: &AppContext, owner: &str, length: i32, url: &str) -> Result<()> {
    match ctx.service.create_one(owner, length, url).await? {
        SaveOutcome::Inserted(link) => {
            println!("{} Created short link:", "✓".bold().green());
            print_link(&link);
        }
        SaveOutcome::UrlConflict(link) => {
            println!("{} URL was already shortened:", "ℹ".bold().blue());
            print_link(&link);
        }
    }
    Ok(())
}

pub async fn shorten_batch(
    ctx: &AppContext,
    owner: &str,
    length: i32,
    file_path: &str,
) -> Result<()> {
    let content = tokio::fs::read(file_path).await.map_err(|e| {
        ShortenerError::file_operation(format!("Failed to read {}: {}", file_path, e))
    })?;
    let items: Vec<BatchLinkRequest> = serde_json::from_slice(&content)?;

    let links = ctx.service.create_batch(owner, length, items).await?;
    println!(
        "{} Processed {} links:",
        "✓".bold().green(),
        links.len().to_string().green()
    );
    for link in &links {
        print_link(link);
    }
    Ok(())
}

pub async fn resolve_link(ctx: &AppContext, uid: &str) -> Result<()> {
    match ctx.service.resolve(uid).await? {
        Some(link) => print_link(&link),
        None => println!("{} Short link not found: {}", "ℹ".bold().blue(), uid.cyan()),
    }
    Ok(())
}

pub async fn list_links(ctx: &AppContext, owner: &str) -> Result<()> {
    let links = ctx.service.list(owner).await?;

    if links.is_empty() {
        println!("{} No short links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Short link list:".bold().green());
    println!();
    for link in &links {
        print_link(link);
    }
    println!();
    println!(
        "{} Total {} short links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );
    Ok(())
}

/// 入队后立即刷盘，命令退出前删除已生效
pub async fn delete_links(ctx: &AppContext, owner: &str, uids: Vec<String>) -> Result<()> {
    let requested = uids.len();
    ctx.service.delete_many(owner, uids)?;
    let deleted = ctx.processor.flush().await?;

    println!(
        "{} Deleted {}/{} short links",
        "✓".bold().green(),
        deleted.to_string().green(),
        requested
    );
    Ok(())
}

pub async fn ping(ctx: &AppContext) -> Result<()> {
    ctx.service.ping().await?;
    println!(
        "{} {} backend is reachable",
        "✓".bold().green(),
        ctx.repository.backend_name().cyan()
    );
    Ok(())
}
