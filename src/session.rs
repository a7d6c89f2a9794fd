//! Turn loop driving one game between two matched players.

use crate::error::{SessionError, SessionErrorKind, TransportError};
use crate::moves::parse_move;
use crate::participant::{ParticipantHandle, Player};
use strictly_board::{Board, Symbol};
use tracing::{debug, error, info, instrument, warn};

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The player with this symbol completed a line.
    Winner(Symbol),
    /// The board filled up without a line.
    Draw,
    /// A transport failed or a player disconnected.
    Aborted,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, turn loop not entered.
    AwaitingStart,
    /// Turn loop running.
    InProgress,
    /// Terminal.
    Finished(Outcome),
}

/// A game between two players.
///
/// Owns the board exclusively. The players' transports stay owned by the
/// transports themselves; the session only tells them when it is over.
#[derive(Debug)]
pub struct Session {
    board: Board,
    players: Vec<Player>,
    winner: Option<usize>,
    phase: SessionPhase,
}

impl Session {
    /// Creates a session over the given players, in session order.
    #[instrument]
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            board: Board::new(),
            players,
            winner: None,
            phase: SessionPhase::AwaitingStart,
        }
    }

    /// Creates a session where `first` plays Cross and `second` plays Circle.
    #[instrument(skip_all, fields(first = first.label(), second = second.label()))]
    pub fn pair(first: ParticipantHandle, second: ParticipantHandle) -> Self {
        Self::new(vec![
            Player::new(first, Symbol::Cross),
            Player::new(second, Symbol::Circle),
        ])
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players in session order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The winner, once there is one.
    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|index| &self.players[index])
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Plays the game to a terminal outcome.
    ///
    /// A win or draw is announced to both players before returning. On a
    /// transport failure the session ends as [`Outcome::Aborted`] without any
    /// announcement and the error is returned. Either way the caller is
    /// expected to [`release`](Self::release) the players afterwards.
    ///
    /// # Errors
    ///
    /// Fails immediately, without starting, unless there are exactly two
    /// players.
    #[instrument(skip(self), fields(players = self.players.len()))]
    pub async fn run(&mut self) -> Result<Outcome, SessionError> {
        if self.players.len() != 2 {
            warn!("Refusing to start session");
            return Err(SessionError::new(SessionErrorKind::WrongPlayerCount(
                self.players.len(),
            )));
        }

        self.phase = SessionPhase::InProgress;
        info!("Session started");

        match self.play().await {
            Ok(outcome) => {
                self.phase = SessionPhase::Finished(outcome);
                info!(?outcome, "Session finished");
                self.announce(outcome).await;
                Ok(outcome)
            }
            Err(e) => {
                self.phase = SessionPhase::Finished(Outcome::Aborted);
                error!(error = %e, "Session aborted");
                Err(e)
            }
        }
    }

    /// Tells every player the session is over.
    #[instrument(skip(self))]
    pub async fn release(&self) {
        for player in &self.players {
            player.handle().on_session_end().await;
        }
        debug!("Players released");
    }

    async fn play(&mut self) -> Result<Outcome, SessionError> {
        for player in &self.players {
            let greeting = format!("You play for {}", player.symbol());
            if let Err(e) = player.handle().notify(&greeting).await {
                warn!(player = ?player, error = %e, "Failed to announce symbol");
            }
        }
        for player in &self.players {
            player.handle().send_board_snapshot(&self.board).await?;
        }

        let mut mover = self.first_mover();
        loop {
            let (x, y) = self.take_turn(mover).await?;
            let symbol = self.players[mover].symbol();
            self.board.place(symbol, x, y);
            debug!(%symbol, x, y, "Move applied");

            for player in &self.players {
                player.handle().on_turn_board_update(&self.board).await;
            }

            if self.board.check_winner(x, y) {
                self.winner = Some(mover);
                return Ok(Outcome::Winner(symbol));
            }
            if self.board.is_full() {
                return Ok(Outcome::Draw);
            }

            mover = 1 - mover;
        }
    }

    /// Cross moves first; without a Cross holder, session order decides.
    fn first_mover(&self) -> usize {
        self.players
            .iter()
            .position(|p| p.symbol() == Symbol::Cross)
            .unwrap_or(0)
    }

    /// Obtains a valid move from `mover` while watching the opponent's
    /// connection.
    #[instrument(skip(self), fields(symbol = %self.players[mover].symbol()))]
    async fn take_turn(&self, mover: usize) -> Result<(usize, usize), SessionError> {
        let current = &self.players[mover];
        let waiting = &self.players[1 - mover];

        waiting
            .handle()
            .notify(&format!("Player {} is thinking", current.symbol()))
            .await?;
        current.handle().begin_turn().await;

        let disconnect = waiting.handle().disconnect_signal();
        tokio::select! {
            result = read_move(current, &self.board) => Ok(result?),
            () = disconnect.fired() => {
                warn!(opponent = ?waiting, "Opponent disconnected during turn");
                Err(SessionError::new(SessionErrorKind::OpponentDisconnected(
                    waiting.symbol(),
                )))
            }
        }
    }

    async fn announce(&self, outcome: Outcome) {
        let message = match outcome {
            Outcome::Winner(symbol) => format!("Player {} won. Thanks for the game!", symbol),
            Outcome::Draw => "Draw!".to_string(),
            Outcome::Aborted => return,
        };
        for player in &self.players {
            if let Err(e) = player.handle().notify(&message).await {
                warn!(player = ?player, error = %e, "Failed to deliver final announcement");
            }
        }
    }
}

/// Asks `player` until the text names an empty cell on `board`.
///
/// Each rejection is explained to the player before asking again. Only a
/// transport failure ends the loop early.
async fn read_move(player: &Player, board: &Board) -> Result<(usize, usize), TransportError> {
    loop {
        let input = player.handle().request_move().await?;
        match parse_move(&input, board) {
            Ok((x, y)) => {
                player.handle().notify("Your move has been accepted").await?;
                return Ok((x, y));
            }
            Err(rejection) => {
                warn!(player = ?player, input = %input, %rejection, "Move rejected");
                player.handle().notify(&rejection.to_string()).await?;
            }
        }
    }
}
