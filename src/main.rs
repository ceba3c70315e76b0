use clap::Parser;

use shortener::cli::{Cli, Commands};
use shortener::config::{get_config, init_config};
use shortener::errors::ShortenerError;
use shortener::interfaces::cli::generate_config;
use shortener::runtime::modes;
use shortener::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    if let Err(e) = run(cli.config.as_deref(), command).await {
        match e.downcast_ref::<ShortenerError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(config_path: Option<&str>, command: Commands) -> anyhow::Result<()> {
    // 生成配置文件不需要启动引擎
    if let Commands::GenerateConfig { output_path, force } = command {
        generate_config(output_path, force)?;
        return Ok(());
    }

    init_config(config_path)?;
    let config = get_config();
    let _guard = init_logging(&config.logging)?;

    match command {
        Commands::Serve => modes::run_server(&config).await,
        other => modes::run_cli(other, &config).await,
    }
}
