//! Concrete implementations of the participant contract.
//!
//! - **telnet**: line-oriented text over TCP
//! - **websocket**: JSON frames over a persistent WebSocket
//!
//! Both spawn a reader task per connection that feeds an [`Inbox`] and fires
//! the participant's disconnect signal when the connection ends.

mod telnet;
mod websocket;

pub use telnet::{TelnetParticipant, render_board, serve_telnet};
pub use websocket::{
    ClientMove, Coordinate, ServerFrame, WebSocketParticipant, serve_websocket, websocket_router,
};

use crate::error::TransportError;
use crate::participant::{DisconnectSignal, DisconnectTrigger, disconnect_channel};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, instrument};

/// Lines received from a connection, waiting to be used as moves.
pub(crate) struct Inbox {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
    signal: DisconnectSignal,
}

/// Reader-task side of an [`Inbox`].
pub(crate) struct InboxFeed {
    lines: mpsc::UnboundedSender<String>,
    trigger: DisconnectTrigger,
}

impl InboxFeed {
    /// Queues a line. Returns `false` once the inbox is gone.
    pub(crate) fn push(&self, line: String) -> bool {
        self.lines.send(line).is_ok()
    }
}

impl Drop for InboxFeed {
    fn drop(&mut self) {
        self.trigger.fire();
    }
}

/// Creates an inbox, its feed and a trigger for the writer side.
pub(crate) fn inbox() -> (Inbox, InboxFeed, DisconnectTrigger) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (trigger, signal) = disconnect_channel();
    let inbox = Inbox {
        lines: Mutex::new(rx),
        signal,
    };
    let feed = InboxFeed {
        lines: tx,
        trigger: trigger.clone(),
    };
    (inbox, feed, trigger)
}

impl Inbox {
    /// The disconnect signal shared with the feed.
    pub(crate) fn signal(&self) -> DisconnectSignal {
        self.signal.clone()
    }

    /// Drops lines that arrived while nobody was asking.
    #[instrument(skip(self))]
    pub(crate) async fn discard_pending(&self) {
        let mut lines = self.lines.lock().await;
        while let Ok(stale) = lines.try_recv() {
            debug!(line = %stale, "Discarding input sent out of turn");
        }
    }

    /// Waits for the next line or the end of the connection.
    ///
    /// Lines already received are handed out before a disconnect is reported.
    pub(crate) async fn next_line(&self) -> Result<String, TransportError> {
        let mut lines = self.lines.lock().await;
        tokio::select! {
            biased;
            line = lines.recv() => line.ok_or_else(|| TransportError::new("Connection closed")),
            () = self.signal.clone().fired() => Err(TransportError::new("Client disconnected")),
        }
    }
}
