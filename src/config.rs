//! Client configuration.
//!
//! Values come from an optional TOML file, then command-line overrides.
//! Anything left unset falls back to the defaults below.

use connectn_board::{Board, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WIN_LENGTH, PlayerColor};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default peer host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default peer port.
pub const DEFAULT_PORT: u16 = 5555;
/// Default number of negotiation rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 30;
/// Default length of one negotiation round.
pub const DEFAULT_ROUND_TIMEOUT_MS: u64 = 1000;

/// Board shape and win length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
#[serde(default)]
pub struct GameConfig {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    columns: usize,
    /// Run length that wins.
    win_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            win_length: DEFAULT_WIN_LENGTH,
        }
    }
}

impl GameConfig {
    /// Builds an empty board of this shape.
    pub fn board(&self) -> Result<Board, ConfigError> {
        Board::new(self.rows, self.columns, self.win_length)
            .map_err(|e| ConfigError::new(format!("Invalid board: {}", e)))
    }
}

/// Color negotiation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize, derive_new::new)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Rounds before giving up.
    max_rounds: u32,
    /// Milliseconds to wait for a reply in each round.
    round_timeout_ms: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_timeout_ms: DEFAULT_ROUND_TIMEOUT_MS,
        }
    }
}

impl NegotiationConfig {
    /// Round length as a [`Duration`].
    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }
}

/// Everything needed to join a game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Peer host.
    host: String,
    /// Peer port.
    port: u16,
    /// Display name sent on connect.
    name: String,
    /// Proposed color.
    color: String,
    /// Board settings.
    game: GameConfig,
    /// Negotiation settings.
    negotiation: NegotiationConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            name: String::new(),
            color: String::new(),
            game: GameConfig::default(),
            negotiation: NegotiationConfig::default(),
        }
    }
}

/// Values that replace whatever the file said.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Peer host.
    pub host: Option<String>,
    /// Peer port.
    pub port: Option<u16>,
    /// Display name.
    pub name: Option<String>,
    /// Proposed color.
    pub color: Option<String>,
    /// Rows.
    pub rows: Option<usize>,
    /// Columns.
    pub columns: Option<usize>,
    /// Win length.
    pub win_length: Option<usize>,
}

impl ClientConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(host = %config.host, port = config.port, "Config loaded");
        Ok(config)
    }

    /// Applies command-line values on top of this configuration.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(name) = overrides.name {
            self.name = name;
        }
        if let Some(color) = overrides.color {
            self.color = color;
        }
        if let Some(rows) = overrides.rows {
            self.game.rows = rows;
        }
        if let Some(columns) = overrides.columns {
            self.game.columns = columns;
        }
        if let Some(win_length) = overrides.win_length {
            self.game.win_length = win_length;
        }
        self
    }

    /// Checks that the configuration can start a session.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::new("Host must not be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::new("Name must not be empty".to_string()));
        }
        // The name goes on the wire as a whole line.
        if self.name.contains(char::is_control) {
            return Err(ConfigError::new(format!(
                "Name {:?} must not contain control characters",
                self.name
            )));
        }
        let color = self.color.trim();
        if color.is_empty() {
            return Err(ConfigError::new("Color must not be empty".to_string()));
        }
        if color.contains(char::is_control) {
            return Err(ConfigError::new(format!(
                "Color {:?} must not contain control characters",
                color
            )));
        }
        if color.contains(char::is_whitespace) {
            return Err(ConfigError::new(format!(
                "Color {:?} must be a single word",
                color
            )));
        }
        if self.negotiation.max_rounds == 0 {
            return Err(ConfigError::new(
                "Negotiation needs at least one round".to_string(),
            ));
        }
        self.game.board()?;
        Ok(())
    }

    /// The proposed color, normalized.
    pub fn player_color(&self) -> PlayerColor {
        PlayerColor::new(&self.color)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
