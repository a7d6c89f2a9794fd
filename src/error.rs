//! Error types with location tracking.

use derive_more::{Display, Error};
use strictly_board::Symbol;
use tracing::instrument;

/// Failure of a participant's transport (socket write, closed stream, ...).
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<tokio_util::codec::LinesCodecError> for TransportError {
    #[track_caller]
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        Self::new(format!("Line codec error: {}", err))
    }
}

impl From<axum::Error> for TransportError {
    #[track_caller]
    fn from(err: axum::Error) -> Self {
        Self::new(format!("WebSocket error: {}", err))
    }
}

impl From<serde_json::Error> for TransportError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Encoding error: {}", err))
    }
}

/// Why a session could not start or had to be aborted.
#[derive(Debug, Clone, Display)]
pub enum SessionErrorKind {
    /// A session needs exactly two participants.
    #[display("Session needs exactly 2 players, got {}", _0)]
    WrongPlayerCount(usize),
    /// A capability call on one of the participants failed.
    #[display("{}", _0)]
    Transport(TransportError),
    /// The waiting participant left while the other one was moving.
    #[display("Player {} disconnected", _0)]
    OpponentDisconnected(Symbol),
}

/// Session error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", kind, file, line)]
pub struct SessionError {
    /// What went wrong.
    pub kind: SessionErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: SessionErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<TransportError> for SessionError {
    #[track_caller]
    fn from(err: TransportError) -> Self {
        Self::new(SessionErrorKind::Transport(err))
    }
}

/// A participant was admitted after the intake loop stopped.
#[derive(Debug, Clone, Display, Error)]
#[display("Intake error: {} at {}:{}", message, file, line)]
pub struct IntakeError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl IntakeError {
    /// Creates a new intake error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
