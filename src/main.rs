//! Strictly Lobby - server binary
//!
//! Accepts players over telnet and WebSocket and pairs them into games.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::net::SocketAddr;
use std::path::Path;
use strictly_lobby::{LobbyConfig, LobbyServer};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            telnet_addr,
            websocket_addr,
            no_telnet,
            no_websocket,
        } => {
            initialize_tracing();
            let config = load_config(&config, telnet_addr, websocket_addr, no_telnet, no_websocket)?;
            run_server(config).await
        }
        Command::Config { config } => {
            let config = LobbyConfig::load_or_default(&config)?;
            print!("{}", toml::to_string_pretty(&config).context("Failed to render config")?);
            Ok(())
        }
    }
}

/// Run the lobby until Ctrl+C
#[instrument(skip_all)]
async fn run_server(config: LobbyConfig) -> Result<()> {
    info!("Starting Strictly Lobby");
    let server = LobbyServer::bind(config).await?;
    if let Some(addr) = server.telnet_addr() {
        info!("Telnet players: telnet {} {}", addr.ip(), addr.port());
    }
    if let Some(addr) = server.websocket_addr() {
        info!("WebSocket players: ws://{}/", addr);
    }
    server.run().await
}

#[instrument(skip(config_path))]
fn load_config(
    config_path: &Path,
    telnet_addr: Option<SocketAddr>,
    websocket_addr: Option<SocketAddr>,
    no_telnet: bool,
    no_websocket: bool,
) -> Result<LobbyConfig> {
    info!(path = %config_path.display(), "Loading lobby configuration");

    let mut config = LobbyConfig::load_or_default(config_path)?;

    // Command-line flags win over the file
    if let Some(addr) = telnet_addr {
        info!(%addr, "Overriding telnet address");
        config = config.with_telnet_addr(addr);
    }
    if let Some(addr) = websocket_addr {
        info!(%addr, "Overriding websocket address");
        config = config.with_websocket_addr(addr);
    }
    if no_telnet {
        config = config.with_enable_telnet(false);
    }
    if no_websocket {
        config = config.with_enable_websocket(false);
    }

    Ok(config)
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_lobby=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Tracing initialized");
}
