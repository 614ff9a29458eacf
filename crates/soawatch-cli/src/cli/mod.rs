//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::{Context as _, Result};
use args::{Cli, Commands};
use clap::Parser;
use soawatch_monitor::Config;

use crate::{paths, telemetry};

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Config from --config, SOAWATCH_CONFIG, or the platform config dir
    let config_path = match cli.config {
        Some(path) => path,
        None => paths::config_file()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    if let Some(store) = cli.store {
        config.store.path = Some(store);
    }
    if config.store.path.is_none() {
        config.store.path = Some(paths::store_file()?);
    }

    telemetry::init(&config.telemetry, cli.verbose);

    let ctx = commands::Context {
        config,
        output: cli.output,
    };

    match cli.command {
        Commands::Tick => commands::tick::execute(ctx).await,
        Commands::Serve(args) => commands::serve::execute(ctx, args).await,
        Commands::Check(args) => commands::check::execute(ctx, args).await,
        Commands::Zone(args) => commands::zone::execute(ctx, args).await,
        Commands::Channel(args) => commands::channel::execute(ctx, args).await,
    }
}
