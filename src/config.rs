//! Server configuration.

use crate::intake::DEFAULT_WAITING_MESSAGE;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for the lobby server.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct LobbyConfig {
    /// Address of the telnet listener.
    #[serde(default = "default_telnet_addr")]
    telnet_addr: SocketAddr,

    /// Address of the WebSocket listener.
    #[serde(default = "default_websocket_addr")]
    websocket_addr: SocketAddr,

    /// Whether to accept telnet players.
    #[serde(default = "default_enabled")]
    enable_telnet: bool,

    /// Whether to accept WebSocket players.
    #[serde(default = "default_enabled")]
    enable_websocket: bool,

    /// Longest line a telnet client may send.
    #[serde(default = "default_max_line_length")]
    max_line_length: usize,

    /// Message sent to a player waiting alone for an opponent.
    #[serde(default = "default_waiting_message")]
    waiting_message: String,
}

fn default_telnet_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5555))
}

fn default_websocket_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_enabled() -> bool {
    true
}

fn default_max_line_length() -> usize {
    256
}

fn default_waiting_message() -> String {
    DEFAULT_WAITING_MESSAGE.to_string()
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            telnet_addr: default_telnet_addr(),
            websocket_addr: default_websocket_addr(),
            enable_telnet: default_enabled(),
            enable_websocket: default_enabled(),
            max_line_length: default_max_line_length(),
            waiting_message: default_waiting_message(),
        }
    }
}

impl LobbyConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!("Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length < 8 {
            return Err(ConfigError::new(format!(
                "max_line_length must be at least 8, got {}",
                self.max_line_length
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
