//! Gravity invariant: no piece floats above an empty cell.

use super::super::Board;
use super::Invariant;

/// Invariant: in every column, occupied cells form a solid stack from
/// the bottom row up.
pub struct GravityInvariant;

impl Invariant<Board> for GravityInvariant {
    fn holds(board: &Board) -> bool {
        (0..board.columns()).all(|column| {
            let mut seen_empty = false;
            (0..board.rows()).rev().all(|row| {
                let empty = board.get(row, column).is_none_or(|cell| cell.is_empty());
                if empty {
                    seen_empty = true;
                    true
                } else {
                    !seen_empty
                }
            })
        })
    }

    fn description() -> &'static str {
        "Pieces rest on the floor or on another piece"
    }
}
