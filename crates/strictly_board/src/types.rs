//! Core domain types for the board.

use serde::{Deserialize, Serialize};

/// Content of a single cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    /// Nobody has played here yet.
    #[default]
    #[strum(to_string = " ")]
    Empty,
    /// Cross, conventionally the first player.
    #[strum(to_string = "X")]
    Cross,
    /// Circle, conventionally the second player.
    #[strum(to_string = "O")]
    Circle,
}

impl Symbol {
    /// Returns the opposing playable symbol. `Empty` has no opponent.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::Cross => Symbol::Circle,
            Symbol::Circle => Symbol::Cross,
            Symbol::Empty => Symbol::Empty,
        }
    }

    /// Whether this symbol marks an occupied cell.
    pub fn is_played(self) -> bool {
        self != Symbol::Empty
    }
}
