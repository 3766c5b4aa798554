//! Full-board detection.

use super::super::Board;

/// Checks if every column is full.
///
/// Only the top row needs to be inspected: gravity guarantees that a
/// column with an occupied top cell is occupied all the way down.
pub fn is_full(board: &Board) -> bool {
    (0..board.columns()).all(|column| board.is_column_full(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerColor;

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::default();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_filled_board_is_full() {
        let mut board = Board::new(2, 2, 2).unwrap();
        let red = PlayerColor::new("red");
        for column in 0..2 {
            board.place_piece(column, &red).unwrap();
            assert!(!is_full(&board));
            board.place_piece(column, &red).unwrap();
        }
        assert!(is_full(&board));
    }
}
