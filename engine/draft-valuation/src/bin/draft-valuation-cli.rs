//! # Draft Valuation CLI Binary
//!
//! Command-line interface for ranking draft picks from a JSON data directory.

use anyhow::{Context, Result};
use clap::Parser;
use draft_valuation::cli::{Cli, CliHandler};
use draft_valuation::{initialize_logging, ValuationConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration: file first, environment on top
    let mut config = match &cli.config {
        Some(path) => ValuationConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ValuationConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }

    initialize_logging(&config.logging)?;

    let handler = CliHandler::new(config, cli.json);
    handler.handle_command(cli.command).await?;

    Ok(())
}
