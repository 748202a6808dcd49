use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use snaplink::cli::{Cli, Commands, ConfigCommands};
use snaplink::config::{StaticConfig, init_config};
use snaplink::runtime::run_server;
use snaplink::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        }) => generate_config(output_path.as_deref(), force),
        Some(Commands::Serve) | None => serve(cli.config.as_deref()).await,
    }
}

async fn serve(config_path: Option<&str>) -> Result<()> {
    let config = match init_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return Err(e).context("Failed to load configuration");
        }
    };

    let _guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    tracing::info!("snaplink {} starting", env!("CARGO_PKG_VERSION"));

    run_server(&config).await
}

fn generate_config(output_path: Option<&str>, force: bool) -> Result<()> {
    let path = output_path.unwrap_or("config.example.toml");
    if path == "-" {
        print!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }
    if Path::new(path).exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path);
    }

    StaticConfig::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path))?;
    println!("Sample configuration written to {}", path);
    Ok(())
}
