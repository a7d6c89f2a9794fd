//! Wiring of listeners, the matchmaking queue and the intake loop.

use crate::config::LobbyConfig;
use crate::error::TransportError;
use crate::intake::intake;
use crate::matchmaking::MatchmakingQueue;
use crate::transports::{serve_telnet, serve_websocket};
use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// A lobby with its listeners bound, ready to run.
#[derive(Debug)]
pub struct LobbyServer {
    config: LobbyConfig,
    telnet: Option<TcpListener>,
    websocket: Option<TcpListener>,
}

impl LobbyServer {
    /// Binds every enabled listener.
    ///
    /// # Errors
    ///
    /// Fails if no transport is enabled or a listener cannot be bound.
    #[instrument(skip(config))]
    pub async fn bind(config: LobbyConfig) -> Result<Self> {
        if !config.enable_telnet() && !config.enable_websocket() {
            anyhow::bail!("No transport enabled; enable telnet or websocket");
        }

        let telnet = if *config.enable_telnet() {
            let listener = TcpListener::bind(config.telnet_addr())
                .await
                .with_context(|| format!("Failed to bind telnet on {}", config.telnet_addr()))?;
            info!(addr = %listener.local_addr()?, "Telnet listener bound");
            Some(listener)
        } else {
            None
        };

        let websocket = if *config.enable_websocket() {
            let listener = TcpListener::bind(config.websocket_addr())
                .await
                .with_context(|| {
                    format!("Failed to bind websocket on {}", config.websocket_addr())
                })?;
            info!(addr = %listener.local_addr()?, "WebSocket listener bound");
            Some(listener)
        } else {
            None
        };

        Ok(Self {
            config,
            telnet,
            websocket,
        })
    }

    /// Local address of the telnet listener, if enabled.
    pub fn telnet_addr(&self) -> Option<SocketAddr> {
        self.telnet.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Local address of the WebSocket listener, if enabled.
    pub fn websocket_addr(&self) -> Option<SocketAddr> {
        self.websocket.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Runs until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns the error of a listener that failed.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs until `shutdown` completes or a listener stops.
    ///
    /// On shutdown the listeners and every running session are cancelled.
    ///
    /// # Errors
    ///
    /// Returns the error of a listener that failed.
    #[instrument(skip_all)]
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let queue = MatchmakingQueue::new();
        let (admissions, intake) = intake(queue);
        let intake = intake.with_waiting_message(self.config.waiting_message().clone());
        let intake_task = tokio::spawn(intake.run());

        let mut listeners: JoinSet<Result<(), TransportError>> = JoinSet::new();
        if let Some(listener) = self.telnet {
            let admissions = admissions.clone();
            let max_line_length = *self.config.max_line_length();
            listeners.spawn(async move {
                serve_telnet(listener, admissions, max_line_length).await;
                Ok(())
            });
        }
        if let Some(listener) = self.websocket {
            listeners.spawn(serve_websocket(listener, admissions.clone()));
        }
        drop(admissions);

        info!("Lobby running");
        let result = tokio::select! {
            () = shutdown => {
                info!("Shutdown requested");
                Ok(())
            }
            Some(stopped) = listeners.join_next() => match stopped {
                Ok(Ok(())) => {
                    warn!("Listener stopped");
                    Ok(())
                }
                Ok(Err(e)) => Err(anyhow::Error::new(e).context("Listener failed")),
                Err(e) => Err(anyhow::Error::new(e).context("Listener task panicked")),
            },
        };

        listeners.shutdown().await;
        intake_task.abort();
        info!("Lobby stopped");
        result
    }
}
