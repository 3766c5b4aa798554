//! Win detection around the last placed piece.

use super::super::{Board, PlayerColor};
use strum::IntoEnumIterator;
use tracing::{instrument, trace};

/// One of the four lines through a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Axis {
    /// Up and down a column.
    Vertical,
    /// Along a row.
    Horizontal,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Axis {
    /// Step `(row, column)` taken when walking forward along the axis.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Axis::Vertical => (1, 0),
            Axis::Horizontal => (0, 1),
            Axis::Diagonal => (1, 1),
            Axis::AntiDiagonal => (1, -1),
        }
    }
}

/// Counts same-colored cells starting one step away from `(row, column)`.
fn count_direction(
    board: &Board,
    row: usize,
    column: usize,
    color: &PlayerColor,
    (d_row, d_column): (isize, isize),
) -> usize {
    let mut count = 0;
    let mut r = row as isize + d_row;
    let mut c = column as isize + d_column;
    while r >= 0 && c >= 0 {
        match board.get(r as usize, c as usize) {
            Some(cell) if cell.is(color) => {
                count += 1;
                r += d_row;
                c += d_column;
            }
            _ => break,
        }
    }
    count
}

/// Length of the contiguous `color` run through `(row, column)` on `axis`.
///
/// The cell itself counts once, whatever it holds.
pub fn run_length(
    board: &Board,
    row: usize,
    column: usize,
    color: &PlayerColor,
    axis: Axis,
) -> usize {
    let (d_row, d_column) = axis.delta();
    1 + count_direction(board, row, column, color, (d_row, d_column))
        + count_direction(board, row, column, color, (-d_row, -d_column))
}

/// Checks whether the piece just placed at `(row, column)` wins.
///
/// Only the four axes through that cell are examined.
#[instrument(skip(board), fields(win_length = board.win_length()))]
pub fn check_win(board: &Board, row: usize, column: usize, color: &PlayerColor) -> bool {
    Axis::iter().any(|axis| {
        let run = run_length(board, row, column, color, axis);
        trace!(%axis, run, "Run measured");
        run >= board.win_length()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn red() -> PlayerColor {
        PlayerColor::new("red")
    }

    fn yellow() -> PlayerColor {
        PlayerColor::new("yellow")
    }

    #[test]
    fn test_single_piece_is_not_a_win() {
        let mut board = Board::default();
        let row = board.place_piece(0, &red()).unwrap();
        assert!(!check_win(&board, row, 0, &red()));
    }

    #[test]
    fn test_horizontal_win_from_middle() {
        let mut board = Board::default();
        for column in [0, 1, 3] {
            board.place_piece(column, &red()).unwrap();
        }
        let row = board.place_piece(2, &red()).unwrap();
        assert_eq!(run_length(&board, row, 2, &red(), Axis::Horizontal), 4);
        assert!(check_win(&board, row, 2, &red()));
    }

    #[test]
    fn test_diagonal_win() {
        let mut board = Board::default();
        // Staircase: column c gets c yellow fillers under a red piece.
        for column in 0..4 {
            for _ in 0..column {
                board.place_piece(column, &yellow()).unwrap();
            }
        }
        for column in 0..3 {
            board.place_piece(column, &red()).unwrap();
        }
        let row = board.place_piece(3, &red()).unwrap();
        assert_eq!(row, 2);
        assert!(check_win(&board, row, 3, &red()));
        assert_eq!(run_length(&board, row, 3, &red(), Axis::AntiDiagonal), 4);
    }

    #[test]
    fn test_mirrored_diagonal_win() {
        let mut board = Board::default();
        // Column c gets 3 - c yellow fillers, so red lands on (2,0) (3,1) (4,2) (5,3).
        for column in 0..4 {
            for _ in 0..(3 - column) {
                board.place_piece(column, &yellow()).unwrap();
            }
        }
        for column in [3, 2, 1] {
            board.place_piece(column, &red()).unwrap();
        }
        let row = board.place_piece(0, &red()).unwrap();
        assert_eq!(row, 2);
        assert_eq!(run_length(&board, row, 0, &red(), Axis::Diagonal), 4);
        assert_eq!(run_length(&board, row, 0, &red(), Axis::AntiDiagonal), 1);
        assert!(check_win(&board, row, 0, &red()));

        // Same run, measured from the far end.
        assert_eq!(run_length(&board, 5, 3, &red(), Axis::Diagonal), 4);
    }

    #[test]
    fn test_other_color_breaks_run() {
        let mut board = Board::default();
        board.place_piece(0, &red()).unwrap();
        board.place_piece(1, &red()).unwrap();
        board.place_piece(2, &yellow()).unwrap();
        let row = board.place_piece(3, &red()).unwrap();
        assert_eq!(run_length(&board, row, 3, &red(), Axis::Horizontal), 1);
        assert!(!check_win(&board, row, 3, &red()));
    }

    #[test]
    fn test_run_counts_placed_cell_once() {
        let mut board = Board::new(1, 3, 3).unwrap();
        board.set_unchecked(0, 0, Cell::Occupied(red()));
        board.set_unchecked(0, 2, Cell::Occupied(red()));
        board.set_unchecked(0, 1, Cell::Occupied(red()));
        assert_eq!(run_length(&board, 0, 1, &red(), Axis::Horizontal), 3);
        assert_eq!(run_length(&board, 0, 1, &red(), Axis::Vertical), 1);
    }

    #[test]
    fn test_win_length_is_configurable() {
        let mut board = Board::new(6, 7, 3).unwrap();
        board.place_piece(4, &red()).unwrap();
        board.place_piece(4, &red()).unwrap();
        let row = board.place_piece(4, &red()).unwrap();
        assert!(check_win(&board, row, 4, &red()));
    }
}
