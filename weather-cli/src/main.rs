//! Binary crate for the `pixel-weather` tool.
//!
//! This crate focuses on:
//! - Serving `/api/weather` and `/api/location` over HTTP
//! - Parsing CLI arguments and interactive configuration
//! - Rendering snapshots as a terminal dialog box

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;
mod server;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.verbose);
    cmd.run().await
}
