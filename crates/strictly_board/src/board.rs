//! Grid storage for a game in progress.

use crate::rules;
use crate::types::Symbol;
use serde::Serialize;
use tracing::instrument;

/// Side length of the board.
pub const BOARD_SIZE: usize = 3;

/// Square grid of symbols stored row by row.
///
/// Cells are addressed as `(x, y)`: `x` is the column, `y` the row, both
/// starting at zero in the top-left corner. The board never validates a
/// coordinate or refuses to overwrite a cell; that is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    size: usize,
    cells: [[Symbol; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            size: BOARD_SIZE,
            cells: [[Symbol::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> &[[Symbol; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Writes `symbol` into `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the board.
    #[instrument(skip(self))]
    pub fn place(&mut self, symbol: Symbol, x: usize, y: usize) {
        self.cells[y][x] = symbol;
    }

    /// Symbol stored at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the board.
    pub fn symbol_at(&self, x: usize, y: usize) -> Symbol {
        self.cells[y][x]
    }

    /// Whether the symbol at `(x, y)` completes a line.
    ///
    /// Only the lines through the last move matter, so this must be called
    /// once per move with that move's coordinate.
    pub fn check_winner(&self, x: usize, y: usize) -> bool {
        rules::win::completes_line(self, x, y)
    }

    /// Whether every cell holds a symbol.
    pub fn is_full(&self) -> bool {
        rules::draw::is_full(self)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
