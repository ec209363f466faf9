//! Newsletter - builds multi-section bulletins and renders them to HTML
//!
//! The working newsletter lives in a JSON data file, is edited through
//! subcommands and rendered to a single self-contained page.

mod app;
mod cli;
mod core;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{CorruptPolicy, NewsletterApp};
use cli::Cli;
use crate::core::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(level)
        .init();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {:#}", e);
        AppConfig::default()
    });

    let base_dir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let policy = if cli.recover {
        CorruptPolicy::Quarantine
    } else {
        CorruptPolicy::Abort
    };

    let mut app = NewsletterApp::start(config, &base_dir, policy)
        .context("Rerun with --recover to move the data file aside and start empty")?;

    cli::run(&mut app, cli.command, cli.config)
}
