//! JSON-over-WebSocket transport.

use super::{Inbox, inbox};
use crate::error::TransportError;
use crate::intake::Admissions;
use crate::participant::{DisconnectSignal, DisconnectTrigger, Participant};
use axum::Router;
use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::Response;
use axum::routing::get;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use strictly_board::Board;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// One coordinate as sent by a client; either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    /// `{"x": 1}`
    Number(i64),
    /// `{"x": "1"}`
    Text(String),
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coordinate::Number(n) => write!(f, "{}", n),
            Coordinate::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Move frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMove {
    /// Column.
    pub x: Coordinate,
    /// Row.
    pub y: Coordinate,
}

impl ClientMove {
    /// The move as `"<x> <y>"` text, validated later by the session.
    pub fn to_line(&self) -> String {
        format!("{} {}", self.x, self.y)
    }
}

/// Frame sent to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Human-readable notification.
    Message {
        /// Text to show.
        message: String,
    },
    /// Full board state.
    Board(Board),
}

/// A player connected over a WebSocket.
pub struct WebSocketParticipant {
    label: String,
    writer: Mutex<SplitSink<WebSocket, Message>>,
    inbox: Inbox,
    trigger: DisconnectTrigger,
    reader: JoinHandle<()>,
}

impl WebSocketParticipant {
    /// Wraps an upgraded socket and starts reading move frames from it.
    #[instrument(skip(socket))]
    pub fn new(socket: WebSocket, peer: SocketAddr) -> Self {
        let label = format!("ws:{}", peer);
        let (writer, mut frames) = socket.split();
        let (inbox, feed, trigger) = inbox();

        let reader_label = label.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientMove>(text.as_str()) {
                        Ok(client_move) => {
                            if !feed.push(client_move.to_line()) {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(peer = %reader_label, error = %e, "Ignoring malformed move frame");
                        }
                    },
                    Ok(Message::Close(_)) => {
                        debug!(peer = %reader_label, "Client closed the socket");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(peer = %reader_label, error = %e, "WebSocket read failed");
                        break;
                    }
                }
            }
        });

        Self {
            label,
            writer: Mutex::new(writer),
            inbox,
            trigger,
            reader,
        }
    }

    async fn send_frame(&self, frame: ServerFrame) -> Result<(), TransportError> {
        let text = serde_json::to_string(&frame)?;
        let mut writer = self.writer.lock().await;
        writer.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

impl Drop for WebSocketParticipant {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait::async_trait]
impl Participant for WebSocketParticipant {
    fn label(&self) -> &str {
        &self.label
    }

    async fn request_move(&self) -> Result<String, TransportError> {
        self.inbox.next_line().await
    }

    async fn notify(&self, message: &str) -> Result<(), TransportError> {
        self.send_frame(ServerFrame::Message {
            message: message.to_string(),
        })
        .await
    }

    async fn send_board_snapshot(&self, board: &Board) -> Result<(), TransportError> {
        self.send_frame(ServerFrame::Board(board.clone())).await
    }

    async fn on_turn_board_update(&self, board: &Board) {
        if let Err(e) = self.send_board_snapshot(board).await {
            warn!(peer = %self.label, error = %e, "Board update failed");
            self.trigger.fire();
        }
    }

    async fn on_session_end(&self) {
        self.reader.abort();
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(Message::Close(None)).await {
            debug!(peer = %self.label, error = %e, "Close frame not delivered");
        }
        if let Err(e) = writer.close().await {
            debug!(peer = %self.label, error = %e, "Close after session failed");
        }
        info!(peer = %self.label, "WebSocket participant released");
    }

    fn disconnect_signal(&self) -> DisconnectSignal {
        self.inbox.signal()
    }
}

/// Router upgrading `GET /` to a game connection.
///
/// Must be served with connect info, see [`serve_websocket`].
pub fn websocket_router(admissions: Admissions) -> Router {
    Router::new()
        .route("/", get(upgrade))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(admissions)
}

async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(admissions): State<Admissions>,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        info!(%peer, "New WebSocket player joined");
        let participant = Arc::new(WebSocketParticipant::new(socket, peer));
        if let Err(e) = admissions.admit(participant) {
            warn!(error = %e, "Could not admit WebSocket player");
        }
    })
}

/// Serves the WebSocket endpoint on `listener` until the server fails.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve_websocket(
    listener: TcpListener,
    admissions: Admissions,
) -> Result<(), TransportError> {
    info!("WebSocket listener ready");
    let app = websocket_router(admissions);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
