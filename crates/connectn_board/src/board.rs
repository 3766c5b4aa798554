//! Board storage and gravity placement.
//!
//! Rows are indexed top to bottom, so row `rows - 1` is the floor and a
//! dropped piece lands on the highest free row index of its column.

use super::action::{Move, PlaceError};
use super::types::{Cell, PlayerColor};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Error creating a board with unusable dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Rows or columns is zero.
    #[display("Board must have at least one row and one column (got {}x{})", rows, columns)]
    EmptyGrid {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        columns: usize,
    },

    /// The grid has more cells than [`MAX_CELLS`](crate::MAX_CELLS).
    #[display("A {}x{} board exceeds the {}-cell limit", rows, columns, max)]
    TooLarge {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        columns: usize,
        /// Largest accepted cell count.
        max: usize,
    },

    /// The run length can never be reached on this grid.
    #[display("Win length {} does not fit a {}x{} board", win_length, rows, columns)]
    UnreachableWinLength {
        /// Requested run length.
        win_length: usize,
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        columns: usize,
    },
}

impl std::error::Error for BoardError {}

/// Connect-N board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    columns: usize,
    win_length: usize,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    /// Moves in the order they were placed.
    history: Vec<Move>,
}

impl Board {
    /// Creates an empty board.
    #[instrument]
    pub fn new(rows: usize, columns: usize, win_length: usize) -> Result<Self, BoardError> {
        if rows == 0 || columns == 0 {
            return Err(BoardError::EmptyGrid { rows, columns });
        }
        let cells = rows
            .checked_mul(columns)
            .filter(|&cells| cells <= super::MAX_CELLS)
            .ok_or(BoardError::TooLarge {
                rows,
                columns,
                max: super::MAX_CELLS,
            })?;
        if win_length == 0 || win_length > rows.max(columns) {
            return Err(BoardError::UnreachableWinLength {
                win_length,
                rows,
                columns,
            });
        }
        Ok(Self {
            rows,
            columns,
            win_length,
            cells: vec![Cell::Empty; cells],
            history: Vec::new(),
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Contiguous run needed to win.
    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Moves placed so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }

    /// Returns the cell at `(row, column)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.index(row, column).map(|idx| &self.cells[idx])
    }

    /// Returns true if the column exists and has no free cell.
    pub fn is_column_full(&self, column: usize) -> bool {
        self.get(0, column).is_some_and(|cell| !cell.is_empty())
    }

    /// Returns true if no column accepts another piece.
    pub fn is_full(&self) -> bool {
        super::rules::is_full(self)
    }

    /// Drops a piece into `column` and returns the row it landed on.
    ///
    /// This is the only way cells change. On error nothing is modified.
    #[instrument(skip(self), fields(rows = self.rows, columns = self.columns))]
    pub fn place_piece(&mut self, column: usize, color: &PlayerColor) -> Result<usize, PlaceError> {
        let row = self.drop_piece(column, color)?;
        debug!(row, column, %color, "Piece placed");

        #[cfg(debug_assertions)]
        super::invariants::assert_invariants(self);

        Ok(row)
    }

    /// Gravity placement without invariant checks, shared with replay.
    pub(crate) fn drop_piece(&mut self, column: usize, color: &PlayerColor) -> Result<usize, PlaceError> {
        if column >= self.columns {
            return Err(PlaceError::ColumnOutOfRange {
                column,
                columns: self.columns,
            });
        }

        let row = (0..self.rows)
            .rev()
            .find(|&row| self.cells[row * self.columns + column].is_empty())
            .ok_or(PlaceError::ColumnFull(column))?;

        self.cells[row * self.columns + column] = Cell::Occupied(color.clone());
        self.history.push(Move::new(column, color.clone()));
        Ok(row)
    }

    /// An empty board with the same dimensions.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            rows: self.rows,
            columns: self.columns,
            win_length: self.win_length,
            cells: vec![Cell::Empty; self.rows * self.columns],
            history: Vec::new(),
        }
    }

    /// Checks whether the piece at `(row, column)` completes a run.
    ///
    /// Must be called right after [`Board::place_piece`] for the same cell.
    pub fn check_win(&self, row: usize, column: usize, color: &PlayerColor) -> bool {
        super::rules::check_win(self, row, column, color)
    }

    /// Formats the board as text, top row first.
    ///
    /// Empty cells render as `.`, occupied cells as the color's initial.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity((self.columns * 2 + 1) * (self.rows + 1));
        for row in 0..self.rows {
            for column in 0..self.columns {
                let symbol = match &self.cells[row * self.columns + column] {
                    Cell::Empty => '.',
                    Cell::Occupied(color) => color.symbol(),
                };
                out.push(symbol);
                if column + 1 < self.columns {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        let footer: Vec<String> = (0..self.columns).map(|c| (c % 10).to_string()).collect();
        out.push_str(&footer.join(" "));
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            rows: super::DEFAULT_ROWS,
            columns: super::DEFAULT_COLUMNS,
            win_length: super::DEFAULT_WIN_LENGTH,
            cells: vec![Cell::Empty; super::DEFAULT_ROWS * super::DEFAULT_COLUMNS],
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Board {
    /// Overwrites a cell without going through gravity. Test-only.
    pub(crate) fn set_unchecked(&mut self, row: usize, column: usize, cell: Cell) {
        let idx = row * self.columns + column;
        self.cells[idx] = cell;
    }
}
