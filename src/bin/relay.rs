//! Relay CLI Binary
//!
//! Command-line interface for context discovery, agent instructions and routing.

use agent_relay::config::ConfigLoader;
use agent_relay::logging::init_logging;
use agent_relay::tooling::cli::{Cli, CliContext};
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
    .context("Failed to load configuration")?;

    cli.apply_logging_overrides(&mut config.logging);
    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let context = CliContext::new(config, cli.contexts.clone())
        .context("Failed to initialize context router")?;

    let output = context.execute(&cli.command).await?;
    println!("{}", output);
    Ok(())
}
