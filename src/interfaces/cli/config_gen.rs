//! Generate config command

use std::path::Path;

use colored::Colorize;

use crate::config::StaticConfig;
use crate::errors::{Result, ShortenerError};

/// Generate example configuration file
pub fn generate_config(output_path: Option<String>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if Path::new(&path).exists() && !force {
        return Err(ShortenerError::file_operation(format!(
            "{} already exists, use --force to overwrite",
            path
        )));
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    std::fs::write(&path, StaticConfig::generate_sample_config()).map_err(|e| {
        ShortenerError::file_operation(format!("Unable to write configuration file: {}", e))
    })?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    Ok(())
}
