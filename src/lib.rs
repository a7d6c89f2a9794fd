//! Strictly Lobby - matchmaking tic-tac-toe server
//!
//! Remote players connect over telnet or WebSocket, wait in a FIFO queue and
//! are paired into sessions that run until a win, a draw or a disconnect.
//!
//! # Architecture
//!
//! - **Participant**: transport-agnostic capability contract for a player
//! - **Session**: turn loop over a [`Board`] and two players
//! - **Matchmaking**: FIFO queue pairing the longest-waiting players
//! - **Intake**: process-wide loop turning admissions into sessions
//! - **Transports**: telnet and WebSocket participants
//!
//! # Example
//!
//! ```no_run
//! use strictly_lobby::{LobbyConfig, LobbyServer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = LobbyConfig::load_or_default("lobby.toml")?;
//! let server = LobbyServer::bind(config).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod intake;
mod matchmaking;
mod moves;
mod participant;
mod server;
mod session;
mod transports;

// Crate-level exports - Configuration
pub use config::{ConfigError, LobbyConfig};

// Crate-level exports - Errors
pub use error::{IntakeError, SessionError, SessionErrorKind, TransportError};

// Crate-level exports - Intake loop
pub use intake::{Admission, Admissions, DEFAULT_WAITING_MESSAGE, Intake, host_session, intake};

// Crate-level exports - Matchmaking
pub use matchmaking::{MatchmakingQueue, PairAttempt};

// Crate-level exports - Move parsing
pub use moves::{MoveRejection, parse_move};

// Crate-level exports - Participant contract
pub use participant::{
    DisconnectSignal, DisconnectTrigger, Participant, ParticipantHandle, Player,
    disconnect_channel,
};

// Crate-level exports - Server
pub use server::LobbyServer;

// Crate-level exports - Session
pub use session::{Outcome, Session, SessionPhase};

// Crate-level exports - Transports
pub use transports::{
    ClientMove, Coordinate, ServerFrame, TelnetParticipant, WebSocketParticipant, render_board,
    serve_telnet, serve_websocket, websocket_router,
};

// Crate-level exports - Board types
pub use strictly_board::{BOARD_SIZE, Board, Symbol};
