//! Monotonic board invariant: cells never change once set.

use super::super::{Board, PlaceError};
use super::Invariant;

/// Invariant: cells are monotonic (never overwritten or cleared).
///
/// Replaying the move history on an empty board of the same shape must
/// reproduce the current board exactly.
pub struct MonotonicBoardInvariant;

/// Rebuilds a board from its move history.
pub fn replay(board: &Board) -> Result<Board, PlaceError> {
    let mut rebuilt = board.cleared();
    for mov in board.history() {
        rebuilt.drop_piece(mov.column, &mov.color)?;
    }
    Ok(rebuilt)
}

impl Invariant<Board> for MonotonicBoardInvariant {
    fn holds(board: &Board) -> bool {
        replay(board).is_ok_and(|rebuilt| rebuilt == *board)
    }

    fn description() -> &'static str {
        "Board cells are monotonic (history replays to the same board)"
    }
}
