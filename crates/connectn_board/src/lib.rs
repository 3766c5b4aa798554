//! Connect-N board logic.
//!
//! A fixed rows × columns grid where pieces drop to the lowest free cell
//! of a column. Win detection only looks at the four axes through the
//! piece that was just placed, so it never rescans the whole board.
//!
//! # Example
//!
//! ```
//! use connectn_board::{Board, PlayerColor};
//!
//! let mut board = Board::new(6, 7, 4).unwrap();
//! let red = PlayerColor::new("Red");
//! let mut last = None;
//! for _ in 0..4 {
//!     last = Some(board.place_piece(3, &red).unwrap());
//! }
//! let row = last.unwrap();
//! assert!(board.check_win(row, 3, &red));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
pub mod invariants;
pub mod rules;
mod types;

pub use action::{Move, PlaceError};
pub use board::{Board, BoardError};
pub use types::{Cell, PlayerColor};

/// Default board height.
pub const DEFAULT_ROWS: usize = 6;
/// Default board width.
pub const DEFAULT_COLUMNS: usize = 7;
/// Default run length needed to win.
pub const DEFAULT_WIN_LENGTH: usize = 4;
/// Largest board, in cells, that [`Board::new`] accepts.
pub const MAX_CELLS: usize = 10_000;
