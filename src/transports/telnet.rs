//! Line-oriented text transport over TCP.

use super::{Inbox, inbox};
use crate::error::TransportError;
use crate::intake::Admissions;
use crate::participant::{DisconnectSignal, DisconnectTrigger, Participant};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use strictly_board::Board;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, instrument, warn};

type LineWriter = SplitSink<Framed<TcpStream, LinesCodec>, String>;

/// A player connected with a plain line-based client such as telnet.
pub struct TelnetParticipant {
    label: String,
    writer: Mutex<LineWriter>,
    inbox: Inbox,
    trigger: DisconnectTrigger,
    reader: JoinHandle<()>,
}

impl TelnetParticipant {
    /// Wraps an accepted connection and starts reading from it.
    ///
    /// Lines longer than `max_line_length` end the connection.
    #[instrument(skip(stream))]
    pub fn new(stream: TcpStream, max_line_length: usize) -> Self {
        let label = stream
            .peer_addr()
            .map(|addr| format!("telnet:{}", addr))
            .unwrap_or_else(|_| "telnet:unknown".to_string());
        let framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));
        let (writer, mut lines) = framed.split();
        let (inbox, feed, trigger) = inbox();

        let peer = label.clone();
        let reader = tokio::spawn(async move {
            while let Some(line) = lines.next().await {
                match line {
                    Ok(line) => {
                        if !feed.push(line) {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(peer = %peer, error = %e, "Telnet read failed");
                        break;
                    }
                }
            }
            debug!(peer = %peer, "Telnet connection closed");
        });

        Self {
            label,
            writer: Mutex::new(writer),
            inbox,
            trigger,
            reader,
        }
    }

    async fn send(&self, text: &str) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.send(format!("{}\r", text)).await?;
        debug!(peer = %self.label, message = %text, "Message sent");
        Ok(())
    }
}

impl Drop for TelnetParticipant {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait::async_trait]
impl Participant for TelnetParticipant {
    fn label(&self) -> &str {
        &self.label
    }

    async fn begin_turn(&self) {
        self.inbox.discard_pending().await;
    }

    async fn request_move(&self) -> Result<String, TransportError> {
        self.send("Your turn").await?;
        self.inbox.next_line().await
    }

    async fn notify(&self, message: &str) -> Result<(), TransportError> {
        self.send(message).await
    }

    async fn send_board_snapshot(&self, board: &Board) -> Result<(), TransportError> {
        self.send(&render_board(board)).await
    }

    async fn on_turn_board_update(&self, board: &Board) {
        if let Err(e) = self.send(&render_board(board)).await {
            warn!(peer = %self.label, error = %e, "Board update failed");
            self.trigger.fire();
        }
    }

    async fn on_session_end(&self) {
        self.reader.abort();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.close().await {
            debug!(peer = %self.label, error = %e, "Close after session failed");
        }
        info!(peer = %self.label, "Telnet participant released");
    }

    fn disconnect_signal(&self) -> DisconnectSignal {
        self.inbox.signal()
    }
}

/// Renders the board as a text grid with column and row numbers.
///
/// ```text
///  |0|1|2|
/// --------
/// 0|X| |O|
/// --------
/// ```
pub fn render_board(board: &Board) -> String {
    let n = board.size();
    let rule = "-".repeat(2 * n + 2);
    let mut lines = Vec::with_capacity(2 * n + 2);

    let mut header = String::from(" ");
    for x in 0..n {
        header.push_str(&format!("|{}", x));
    }
    header.push('|');
    lines.push(header);
    lines.push(rule.clone());

    for (y, row) in board.rows().iter().enumerate() {
        let mut line = format!("{}|", y);
        for symbol in row {
            line.push_str(&format!("{}|", symbol));
        }
        lines.push(line);
        lines.push(rule.clone());
    }

    lines.join("\r\n")
}

/// Accepts telnet connections and admits each one as a participant.
///
/// Returns once admissions are no longer accepted.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve_telnet(listener: TcpListener, admissions: Admissions, max_line_length: usize) {
    info!("Telnet listener ready");
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Failed to accept telnet connection");
                continue;
            }
        };
        info!(%peer, "New telnet player joined");

        let participant = Arc::new(TelnetParticipant::new(stream, max_line_length));
        if let Err(e) = admissions.admit(participant) {
            warn!(error = %e, "Telnet listener stopping");
            return;
        }
    }
}
