//! Pure tic-tac-toe board logic.
//!
//! The board knows how to store symbols and how to evaluate them. It performs
//! no validation of its own: callers check bounds and occupancy before
//! placing, and ask for a winner once per move using that move's coordinate.
//!
//! ```
//! use strictly_board::{Board, Symbol};
//!
//! let mut board = Board::new();
//! board.place(Symbol::Cross, 0, 0);
//! board.place(Symbol::Cross, 1, 0);
//! board.place(Symbol::Cross, 2, 0);
//! assert!(board.check_winner(2, 0));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
pub mod rules;
mod types;

pub use board::{BOARD_SIZE, Board};
pub use types::Symbol;
