//! Capability contract every transport-backed player implements.

use crate::error::TransportError;
use std::sync::Arc;
use strictly_board::{Board, Symbol};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Shared handle to a participant, as passed around by transports, the
/// matchmaking queue and sessions.
pub type ParticipantHandle = Arc<dyn Participant>;

/// What a session may ask of a remote player.
///
/// Implementations own their connection. A session never closes it; it only
/// calls [`Participant::on_session_end`] once the game is over.
#[async_trait::async_trait]
pub trait Participant: Send + Sync {
    /// Human-readable identity, used for logging.
    fn label(&self) -> &str;

    /// Called once when this participant's turn starts, before the first
    /// [`request_move`](Participant::request_move) of that turn.
    ///
    /// Re-prompts after a rejected move do not call it again.
    async fn begin_turn(&self) {}

    /// Waits until the remote side supplies a move.
    ///
    /// Returns the raw text; the session validates it. An error means the
    /// transport failed. Input already received is returned in order.
    async fn request_move(&self) -> Result<String, TransportError>;

    /// Delivers a human-readable message.
    async fn notify(&self, message: &str) -> Result<(), TransportError>;

    /// Delivers the full board.
    async fn send_board_snapshot(&self, board: &Board) -> Result<(), TransportError>;

    /// Informs the participant that the board changed after any move.
    ///
    /// Failures must fire the participant's disconnect signal instead of
    /// being returned.
    async fn on_turn_board_update(&self, board: &Board);

    /// The session is over; the participant may release its resources.
    async fn on_session_end(&self);

    /// One-shot signal fired when the underlying transport goes away.
    fn disconnect_signal(&self) -> DisconnectSignal;
}

/// Creates a connected trigger and signal pair.
pub fn disconnect_channel() -> (DisconnectTrigger, DisconnectSignal) {
    let (tx, rx) = watch::channel(false);
    (DisconnectTrigger { tx: Arc::new(tx) }, DisconnectSignal { rx })
}

/// Transport side of a disconnect signal.
#[derive(Debug, Clone)]
pub struct DisconnectTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl DisconnectTrigger {
    /// Fires the signal. Firing more than once has no further effect.
    #[instrument(skip(self))]
    pub fn fire(&self) {
        if !self.tx.send_replace(true) {
            debug!("Disconnect signal fired");
        }
    }
}

/// Observer side of a disconnect signal.
///
/// Dropping every [`DisconnectTrigger`] counts as a disconnect, since nobody
/// is left to report on the transport.
#[derive(Debug, Clone)]
pub struct DisconnectSignal {
    rx: watch::Receiver<bool>,
}

impl DisconnectSignal {
    /// Whether the signal has already fired.
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Completes once the signal fires.
    pub async fn fired(mut self) {
        // An error means the trigger was dropped, which is a disconnect too.
        let _ = self.rx.wait_for(|fired| *fired).await;
    }
}

/// A matched participant together with its assigned symbol.
#[derive(Clone, derive_new::new)]
pub struct Player {
    handle: ParticipantHandle,
    symbol: Symbol,
}

impl Player {
    /// The capability handle.
    pub fn handle(&self) -> &ParticipantHandle {
        &self.handle
    }

    /// The symbol this player places.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("label", &self.handle.label())
            .field("symbol", &self.symbol)
            .finish()
    }
}
