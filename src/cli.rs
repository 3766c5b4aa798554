//! Command-line interface for connectn.

use crate::config::Overrides;
use crate::coordinator::SessionHandle;
use crate::error::SessionError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Connect-N client for the line-based game protocol
#[derive(Parser, Debug)]
#[command(name = "connectn")]
#[command(about = "Play Connect-N against a remote peer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a peer and play, reading moves from stdin
    Play {
        /// TOML config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Peer host
        #[arg(long)]
        host: Option<String>,

        /// Peer port
        #[arg(short, long)]
        port: Option<u16>,

        /// Display name sent on connect
        #[arg(short, long)]
        name: Option<String>,

        /// Color to propose
        #[arg(long)]
        color: Option<String>,

        /// Board rows
        #[arg(long)]
        rows: Option<usize>,

        /// Board columns
        #[arg(long)]
        columns: Option<usize>,

        /// Pieces in a row needed to win
        #[arg(long)]
        win_length: Option<usize>,

        /// Print notifications as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file and print the effective settings
    CheckConfig {
        /// Path to the TOML file
        path: PathBuf,
    },
}

impl Command {
    /// Flag values for [`crate::ClientConfig::with_overrides`].
    pub fn overrides(&self) -> Overrides {
        match self {
            Command::Play {
                host,
                port,
                name,
                color,
                rows,
                columns,
                win_length,
                ..
            } => Overrides {
                host: host.clone(),
                port: *port,
                name: name.clone(),
                color: color.clone(),
                rows: *rows,
                columns: *columns,
                win_length: *win_length,
            },
            Command::CheckConfig { .. } => Overrides::default(),
        }
    }
}

/// A line typed by the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Drop a piece.
    Place(usize),
    /// End the turn.
    EndTurn,
    /// Leave the game.
    Quit,
}

/// Parses a stdin line: `<col>`, `drop <col>`, `end` or `quit`.
///
/// Returns `None` for anything else.
pub fn parse_input(line: &str) -> Option<Input> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?.to_ascii_lowercase();
    let input = match first.as_str() {
        "end" | "e" => Input::EndTurn,
        "quit" | "q" | "exit" => Input::Quit,
        "drop" | "d" => Input::Place(tokens.next()?.parse().ok()?),
        other => Input::Place(other.parse().ok()?),
    };
    tokens.next().is_none().then_some(input)
}

/// What became of one line of local input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarded {
    /// The matching command was queued.
    Sent,
    /// The line was not a command; nothing was sent.
    Unrecognized,
    /// Input ended and the session was asked to shut down.
    InputClosed,
}

/// Hands one stdin line to the session. `None` is end of input, which
/// shuts the session down.
pub fn forward(handle: &SessionHandle, line: Option<&str>) -> Result<Forwarded, SessionError> {
    let Some(line) = line else {
        handle.shutdown()?;
        return Ok(Forwarded::InputClosed);
    };
    match parse_input(line) {
        Some(Input::Place(column)) => handle.request_placement(column)?,
        Some(Input::EndTurn) => handle.request_end_turn()?,
        Some(Input::Quit) => handle.shutdown()?,
        None => return Ok(Forwarded::Unrecognized),
    }
    Ok(Forwarded::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("3"), Some(Input::Place(3)));
        assert_eq!(parse_input("drop 0"), Some(Input::Place(0)));
        assert_eq!(parse_input(" END "), Some(Input::EndTurn));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
        assert_eq!(parse_input("drop"), None);
        assert_eq!(parse_input("3 4"), None);
        assert_eq!(parse_input("left"), None);
        assert_eq!(parse_input(""), None);
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from(["connectn", "play", "--name", "Ana", "--color", "red", "-p", "6000"]);
        let overrides = cli.command.overrides();
        assert_eq!(overrides.name.as_deref(), Some("Ana"));
        assert_eq!(overrides.port, Some(6000));
        assert_eq!(overrides.host, None);
    }
}
