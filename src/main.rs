//! Server entry point for the exam-paper catalog.

use anyhow::{Context, Result};
use clap::Parser;
use exampapers_core::catalog::Catalog;
use exampapers_core::fetch::FetchEngine;
use exampapers_core::server::{self, AppState};
use tokio::net::TcpListener;
use tracing::{debug, info};

mod cli;
mod config;

use cli::Args;
use config::{RuntimeConfig, load_file_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?;
    let runtime = RuntimeConfig::resolve(&args, file_config)?;
    debug!(?runtime, "configuration resolved");

    let catalog = match runtime.catalog_path.as_deref() {
        Some(path) => Catalog::load_json(path)
            .with_context(|| format!("Failed to load catalog '{}'", path.display()))?,
        None => Catalog::builtin(),
    };
    info!(papers = catalog.len(), "catalog loaded");

    let engine = FetchEngine::new(runtime.fetch).context("Failed to build fetch engine")?;
    let state = AppState::new(catalog, engine, runtime.server);

    let listener = TcpListener::bind(runtime.bind)
        .await
        .with_context(|| format!("Failed to bind {}", runtime.bind))?;

    server::serve(listener, state).await.context("Server error")?;

    info!("server stopped");
    Ok(())
}
