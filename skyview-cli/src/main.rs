//! Binary crate for the `skyview` weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive menus and configuration
//! - Painting the dashboard view model to the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod interactive;
mod paint;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
