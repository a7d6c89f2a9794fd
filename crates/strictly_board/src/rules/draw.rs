//! Draw detection logic for tic-tac-toe.

use crate::{Board, Symbol};
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board
        .rows()
        .iter()
        .all(|row| row.iter().all(|s| *s != Symbol::Empty))
}
