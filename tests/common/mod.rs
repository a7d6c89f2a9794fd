//! In-memory participant driven by a script of moves.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_lobby::{
    Board, DisconnectSignal, DisconnectTrigger, Participant, TransportError, disconnect_channel,
};
use tokio::sync::{Notify, mpsc};

/// Everything a session did to a participant, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TurnStarted,
    MoveRequested,
    Notified(String),
    Snapshot(Board),
    BoardUpdate(Board),
    SessionEnded,
}

pub struct ScriptedParticipant {
    label: String,
    moves: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    events: Mutex<Vec<Event>>,
    move_requested: Notify,
    failing: AtomicBool,
    notify_delay: Mutex<Option<Duration>>,
    trigger: DisconnectTrigger,
    signal: DisconnectSignal,
}

/// Keeps a participant's move channel open and feeds it.
pub struct Script {
    tx: mpsc::UnboundedSender<String>,
}

impl Script {
    pub fn push(&self, line: &str) {
        self.tx.send(line.to_string()).unwrap();
    }
}

impl ScriptedParticipant {
    /// A participant that blocks on move requests until the script is fed.
    pub fn new(label: &str) -> (Arc<Self>, Script) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (trigger, signal) = disconnect_channel();
        let participant = Arc::new(Self {
            label: label.to_string(),
            moves: tokio::sync::Mutex::new(rx),
            events: Mutex::new(Vec::new()),
            move_requested: Notify::new(),
            failing: AtomicBool::new(false),
            notify_delay: Mutex::new(None),
            trigger,
            signal,
        });
        (participant, Script { tx })
    }

    /// A participant whose transport fails once `moves` run out.
    pub fn with_moves(label: &str, moves: &[&str]) -> Arc<Self> {
        let (participant, script) = Self::new(label);
        for line in moves {
            script.push(line);
        }
        participant
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notified(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn move_requests(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == Event::MoveRequested)
            .count()
    }

    /// Makes every later `notify` and snapshot fail.
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Makes the next `notify` take `delay` before it is delivered.
    pub fn delay_next_notification(&self, delay: Duration) {
        *self.notify_delay.lock().unwrap() = Some(delay);
    }

    pub fn disconnect(&self) {
        self.trigger.fire();
    }

    /// Completes once a move has been requested.
    pub async fn wait_for_move_request(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.move_requested.notified())
            .await
            .expect("no move was requested");
    }

    /// Completes once a notification equal to `text` arrived.
    pub async fn wait_for_notification(&self, text: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.notifications().iter().any(|n| n == text) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("notification never arrived");
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn check_delivery(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TransportError::new("delivery failed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl Participant for ScriptedParticipant {
    fn label(&self) -> &str {
        &self.label
    }

    async fn begin_turn(&self) {
        self.record(Event::TurnStarted);
    }

    async fn request_move(&self) -> Result<String, TransportError> {
        self.record(Event::MoveRequested);
        self.move_requested.notify_one();
        let mut moves = self.moves.lock().await;
        tokio::select! {
            biased;
            line = moves.recv() => line.ok_or_else(|| TransportError::new("script exhausted")),
            () = self.signal.clone().fired() => Err(TransportError::new("disconnected")),
        }
    }

    async fn notify(&self, message: &str) -> Result<(), TransportError> {
        let delay = self.notify_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_delivery()?;
        self.record(Event::Notified(message.to_string()));
        Ok(())
    }

    async fn send_board_snapshot(&self, board: &Board) -> Result<(), TransportError> {
        self.check_delivery()?;
        self.record(Event::Snapshot(board.clone()));
        Ok(())
    }

    async fn on_turn_board_update(&self, board: &Board) {
        if self.check_delivery().is_err() {
            self.trigger.fire();
            return;
        }
        self.record(Event::BoardUpdate(board.clone()));
    }

    async fn on_session_end(&self) {
        self.record(Event::SessionEnded);
    }

    fn disconnect_signal(&self) -> DisconnectSignal {
        self.signal.clone()
    }
}
