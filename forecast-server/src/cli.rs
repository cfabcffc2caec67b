use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use forecast_core::{Config, gateway_from_config};

use crate::app::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast-server", version, about = "Marine forecast proxy for StormGlass")]
pub struct Cli {
    /// Port to listen on; overrides `PORT` and the config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to a TOML config file instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve configuration, refusing to continue without an API key.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(port) = self.port {
            config.port = port;
        }

        config.api_key()?;
        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        let gateway = gateway_from_config(&config)?;
        let app = app::router(AppState::new(gateway));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!("Server listening on http://localhost:{}", config.port);
        tracing::info!("Forecast endpoint: http://localhost:{}/weatherforecast", config.port);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
