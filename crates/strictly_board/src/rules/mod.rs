//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board. Rules are kept apart from board
//! storage so they can be tested on hand-built positions.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::completes_line;
