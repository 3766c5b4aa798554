//! Turn-synchronized Connect-N client.
//!
//! Two peers share a board over a newline-delimited text protocol. This
//! crate handles one side: it negotiates a color, learns its turn order,
//! applies local and remote moves to its own copy of the board, and
//! decides wins locally.
//!
//! # Architecture
//!
//! - **Protocol**: line codec ([`protocol`])
//! - **Turn**: the state machine that owns the board ([`Session`])
//! - **Negotiation**: the opening color handshake ([`negotiate`])
//! - **Coordinator**: the actor that serializes every input ([`Coordinator`])
//! - **Presentation**: commands in, notifications out ([`Command`], [`Notification`])
//!
//! # Example
//!
//! ```no_run
//! use connectn::{ClientConfig, Coordinator, Session, TcpConnection, negotiate};
//!
//! # async fn example(config: ClientConfig) -> anyhow::Result<()> {
//! let mut connection = TcpConnection::connect(config.host(), *config.port()).await?;
//! let mut session = Session::new(config.player_color(), config.game().board()?);
//! negotiate(&mut session, &mut connection, config.name(), config.negotiation()).await?;
//!
//! let (handle, mut notifications) = Coordinator::start(session, connection);
//! handle.request_placement(3)?;
//! while let Some(notification) = notifications.recv().await {
//!     println!("{notification}");
//! }
//! let outcome = handle.join().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod coordinator;
mod error;
mod negotiation;
mod presentation;
pub mod protocol;
mod transport;
mod turn;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, GameConfig, NegotiationConfig, Overrides};

// Crate-level exports - Session
pub use coordinator::{Coordinator, SessionEvent, SessionHandle};
pub use error::SessionError;
pub use negotiation::negotiate;
pub use turn::{IllegalMove, Outcome, Reaction, Session, TurnState};

// Crate-level exports - Wire and presentation
pub use presentation::{Command, Notification};
pub use protocol::{DecodeError, Inbound, Outbound, Role};
pub use transport::{Connection, LineReader, TcpConnection};

// Crate-level exports - Board
pub use connectn_board::{Board, Cell, PlayerColor};
