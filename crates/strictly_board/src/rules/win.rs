//! Win detection keyed on the last move.

use crate::{Board, Symbol};
use tracing::instrument;

/// Checks whether the symbol at `(x, y)` fills a complete line.
///
/// A single pass tallies the row and column through `(x, y)` together with
/// both diagonals. An empty cell never wins.
#[instrument(skip(board))]
pub fn completes_line(board: &Board, x: usize, y: usize) -> bool {
    let symbol = board.symbol_at(x, y);
    if symbol == Symbol::Empty {
        return false;
    }

    let n = board.size();
    let (mut row, mut col, mut diag, mut anti_diag) = (0, 0, 0, 0);

    for i in 0..n {
        if board.symbol_at(i, y) == symbol {
            row += 1;
        }
        if board.symbol_at(x, i) == symbol {
            col += 1;
        }
        if board.symbol_at(i, i) == symbol {
            diag += 1;
        }
        if board.symbol_at(n - 1 - i, i) == symbol {
            anti_diag += 1;
        }
    }

    row == n || col == n || diag == n || anti_diag == n
}
