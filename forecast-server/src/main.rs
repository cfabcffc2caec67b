//! Binary crate for the marine forecast proxy.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and resolving configuration
//! - Serving `/weatherforecast` and `/health`
//! - Translating gateway results into HTTP responses

use clap::Parser;

mod app;
mod cli;
mod handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
