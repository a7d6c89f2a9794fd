//! Parsing and validation of move text.

use derive_more::Display;
use strictly_board::Board;
use tracing::instrument;

/// Reason a line of move text was refused.
///
/// The display text is sent back to the player before asking again.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// Anything other than two tokens.
    #[display("Enter your move as two numbers: <x> <y>")]
    WrongTokenCount(usize),
    /// A token that is not a non-negative base-10 integer.
    #[display("Not a valid coordinate: {}", _0)]
    NotANumber(String),
    /// Coordinate outside the board.
    #[display("Out of bounds")]
    OutOfBounds {
        /// Column requested.
        x: usize,
        /// Row requested.
        y: usize,
    },
    /// Target cell already holds a symbol.
    #[display("Cell {} {} is already taken", x, y)]
    Occupied {
        /// Column requested.
        x: usize,
        /// Row requested.
        y: usize,
    },
}

/// Parses `"<x> <y>"` and checks it against `board`.
///
/// Returns the coordinate of an empty cell inside the board.
#[instrument(skip(board))]
pub fn parse_move(text: &str, board: &Board) -> Result<(usize, usize), MoveRejection> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [x, y] = tokens.as_slice() else {
        return Err(MoveRejection::WrongTokenCount(tokens.len()));
    };

    let x = parse_coordinate(x)?;
    let y = parse_coordinate(y)?;

    if x >= board.size() || y >= board.size() {
        return Err(MoveRejection::OutOfBounds { x, y });
    }
    if board.symbol_at(x, y).is_played() {
        return Err(MoveRejection::Occupied { x, y });
    }

    Ok((x, y))
}

fn parse_coordinate(token: &str) -> Result<usize, MoveRejection> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoveRejection::NotANumber(token.to_string()));
    }
    // All digits, so parsing only fails on overflow, which is out of bounds.
    Ok(token.parse().unwrap_or(usize::MAX))
}
