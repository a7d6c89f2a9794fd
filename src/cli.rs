//! Command-line interface for strictly_lobby.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;

/// Strictly Lobby - matchmaking tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "strictly_lobby")]
#[command(about = "Pairs telnet and WebSocket players into tic-tac-toe games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the lobby server
    Serve {
        /// Path to the TOML config file (defaults are used if it is missing)
        #[arg(short, long, default_value = "lobby.toml")]
        config: std::path::PathBuf,

        /// Override the telnet listen address
        #[arg(long)]
        telnet_addr: Option<SocketAddr>,

        /// Override the WebSocket listen address
        #[arg(long)]
        websocket_addr: Option<SocketAddr>,

        /// Do not accept telnet players
        #[arg(long)]
        no_telnet: bool,

        /// Do not accept WebSocket players
        #[arg(long)]
        no_websocket: bool,
    },

    /// Print the effective configuration as TOML and exit
    Config {
        /// Path to the TOML config file
        #[arg(short, long, default_value = "lobby.toml")]
        config: std::path::PathBuf,
    },
}
