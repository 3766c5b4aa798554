//! Line protocol codec.
//!
//! One message per line, fields separated by spaces. Command tokens are
//! case-sensitive; color values are normalized to lower case. Decoding
//! never fails on lines it does not recognize: those are skipped so newer
//! peers can add messages.

use connectn_board::PlayerColor;
use tracing::{instrument, trace};

/// Turn-order role assigned by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum Role {
    /// Moves first.
    #[strum(serialize = "PLAYER1")]
    Player1,
    /// Moves second.
    #[strum(serialize = "PLAYER2")]
    Player2,
}

/// A decoded message from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `COLOR <color>`: the peer announces a color.
    Color(PlayerColor),
    /// `COLOR_ACCEPTED`: our proposal was accepted.
    ColorAccepted,
    /// `COLOR_REJECTED <reason>`: our proposal was refused.
    ColorRejected(String),
    /// `SEND_COLOR`: re-send our proposal.
    SendColor,
    /// `ROLE PLAYER1|PLAYER2`.
    Role(Role),
    /// `YOUR_TURN`.
    YourTurn,
    /// `WAIT`.
    Wait,
    /// `MOVE <col>`: the opponent dropped a piece.
    Move(usize),
    /// `GAME_OVER`.
    GameOver,
}

/// A message we send to the peer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Outbound {
    /// Display name, sent once as the first line.
    #[display("{}", _0)]
    Hello(String),
    /// Color proposal.
    #[display("COLOR {}", _0)]
    Color(PlayerColor),
    /// A local placement.
    #[display("MOVE {}", _0)]
    Move(usize),
    /// Local turn finished.
    #[display("END_TURN")]
    EndTurn,
    /// We won.
    #[display("GAME_OVER")]
    GameOver,
}

/// A line that names a known message but cannot be decoded.
///
/// Decode errors are reported and the line is dropped; the connection
/// stays open.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum DecodeError {
    /// A required argument is absent.
    #[display("{} is missing its {} argument", command, argument)]
    MissingArgument {
        /// Command token.
        command: &'static str,
        /// Name of the absent argument.
        argument: &'static str,
    },

    /// `MOVE` with something other than a non-negative integer.
    #[display("MOVE column {:?} is not a non-negative integer", _0)]
    InvalidColumn(String),

    /// `ROLE` with something other than `PLAYER1`/`PLAYER2`.
    #[display("Unknown role {:?}", _0)]
    UnknownRole(String),

    /// The line is not valid UTF-8.
    #[display("Line is not valid UTF-8 (bad byte at offset {})", valid_up_to)]
    InvalidUtf8 {
        /// Length of the valid prefix.
        valid_up_to: usize,
    },
}

impl std::error::Error for DecodeError {}

/// Decodes one line.
///
/// Returns `Ok(None)` for blank or unrecognized lines.
#[instrument(level = "trace")]
pub fn decode(line: &str) -> Result<Option<Inbound>, DecodeError> {
    let mut tokens = line.trim_end().split_whitespace();
    let Some(command) = tokens.next() else {
        return Ok(None);
    };

    let message = match command {
        "COLOR" => {
            let color = tokens.next().ok_or(DecodeError::MissingArgument {
                command: "COLOR",
                argument: "color",
            })?;
            Inbound::Color(PlayerColor::new(color))
        }
        "COLOR_ACCEPTED" => Inbound::ColorAccepted,
        "COLOR_REJECTED" => Inbound::ColorRejected(tokens.collect::<Vec<_>>().join(" ")),
        "SEND_COLOR" => Inbound::SendColor,
        "ROLE" => {
            let role = tokens.next().ok_or(DecodeError::MissingArgument {
                command: "ROLE",
                argument: "role",
            })?;
            Inbound::Role(
                role.parse()
                    .map_err(|_| DecodeError::UnknownRole(role.to_string()))?,
            )
        }
        "YOUR_TURN" => Inbound::YourTurn,
        "WAIT" => Inbound::Wait,
        "MOVE" => {
            let column = tokens.next().ok_or(DecodeError::MissingArgument {
                command: "MOVE",
                argument: "column",
            })?;
            Inbound::Move(
                column
                    .parse()
                    .map_err(|_| DecodeError::InvalidColumn(column.to_string()))?,
            )
        }
        "GAME_OVER" => Inbound::GameOver,
        other => {
            trace!(command = other, "Ignoring unknown message");
            return Ok(None);
        }
    };

    Ok(Some(message))
}

/// Decodes one raw line as read off the wire.
///
/// Bytes that are not UTF-8 are a [`DecodeError::InvalidUtf8`], never an
/// I/O failure.
pub fn decode_bytes(line: &[u8]) -> Result<Option<Inbound>, DecodeError> {
    let text = std::str::from_utf8(line).map_err(|e| DecodeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    decode(text)
}

/// Encodes a message as a line without its terminator.
pub fn encode(message: &Outbound) -> String {
    message.to_string()
}
