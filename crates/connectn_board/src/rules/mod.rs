//! Game rules for Connect-N.
//!
//! Pure functions over a [`Board`](crate::Board), kept apart from the
//! storage so they can be tested on hand-built positions.

pub mod full;
pub mod win;

pub use full::is_full;
pub use win::{check_win, run_length, Axis};
