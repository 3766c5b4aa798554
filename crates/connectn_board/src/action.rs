//! Placement records and placement errors.

use super::PlayerColor;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A piece dropped into a column.
///
/// Moves are historical facts: once recorded they never change. The
/// board keeps them in order so its state can be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Column the piece was dropped into (0-based).
    pub column: usize,
    /// Color of the dropped piece.
    pub color: PlayerColor,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(column: usize, color: PlayerColor) -> Self {
        Self { column, color }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> column {}", self.color, self.column)
    }
}

/// Error returned when a piece cannot be placed.
///
/// A failed placement never mutates the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlaceError {
    /// Every cell of the column is occupied.
    #[display("Column {} is full", _0)]
    ColumnFull(usize),

    /// The column does not exist on this board.
    #[display("Column {} is out of range (board has {} columns)", column, columns)]
    ColumnOutOfRange {
        /// Requested column.
        column: usize,
        /// Number of columns on the board.
        columns: usize,
    },
}

impl std::error::Error for PlaceError {}
