//! Commands from and notifications to the presentation layer.

use crate::turn::Outcome;
use connectn_board::PlayerColor;
use serde::{Deserialize, Serialize};

/// A local user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Drop a piece into the given column.
    RequestPlacement {
        /// Target column (0-based).
        column: usize,
    },
    /// Finish the turn after placing.
    RequestEndTurn,
}

/// Something the presentation layer should reflect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// A piece landed.
    #[display("cell ({}, {}) filled by {}", row, column, color)]
    CellFilled {
        /// Row the piece landed on.
        row: usize,
        /// Column it was dropped into.
        column: usize,
        /// Color of the piece.
        color: PlayerColor,
    },
    /// Whether local placement is possible changed.
    #[display("{}", if *can_place { "your turn" } else { "waiting" })]
    TurnChanged {
        /// True when the board accepts a local piece.
        can_place: bool,
    },
    /// A placement command was refused; nothing changed.
    #[display("placement rejected: {}", reason)]
    PlacementRejected {
        /// Why.
        reason: String,
    },
    /// An end-turn command was refused; nothing changed.
    #[display("end turn rejected: {}", reason)]
    EndTurnRejected {
        /// Why.
        reason: String,
    },
    /// An inbound line was malformed or arrived in the wrong state.
    #[display("input discarded: {}", reason)]
    InputDiscarded {
        /// Why.
        reason: String,
    },
    /// Colors are known for both sides.
    #[display("you are {}, opponent is {}", local, opponent)]
    ColorAssigned {
        /// Our color.
        local: PlayerColor,
        /// Opponent color.
        opponent: PlayerColor,
    },
    /// The game reached a terminal state.
    #[display("game over: {}", outcome)]
    GameEnded {
        /// How it ended.
        outcome: Outcome,
    },
}
