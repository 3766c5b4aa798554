//! Core domain types for Connect-N.

use serde::{Deserialize, Serialize};

/// Opaque identifier for one participant's pieces.
///
/// Colors arrive as free-form wire tokens, so they are normalized to
/// lower case on construction. Equality is the only operation the game
/// relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "String", into = "String")]
pub struct PlayerColor(String);

impl PlayerColor {
    /// Creates a color from any casing of its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// Returns the normalized color name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Single character used when rendering the board as text.
    pub fn symbol(&self) -> char {
        self.0
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

impl From<String> for PlayerColor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for PlayerColor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<PlayerColor> for String {
    fn from(color: PlayerColor) -> Self {
        color.0
    }
}

/// A cell on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing dropped here yet.
    #[default]
    Empty,
    /// Cell holds a piece of the given color.
    Occupied(PlayerColor),
}

impl Cell {
    /// Returns true if the cell holds a piece of `color`.
    pub fn is(&self, color: &PlayerColor) -> bool {
        matches!(self, Cell::Occupied(c) if c == color)
    }

    /// Returns true if nothing has been placed here.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}
