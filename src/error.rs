//! Fatal session errors.

use derive_more::Display;

/// An error that ends the session.
///
/// Every variant leaves the transport closed and no further messages are
/// sent. Recoverable problems (malformed lines, illegal commands) never
/// show up here; they become notifications instead.
#[derive(Debug, Display)]
pub enum SessionError {
    /// Connection refused, reset, or closed while it was still needed.
    #[display("Transport error: {}", _0)]
    Transport(std::io::Error),

    /// Color negotiation did not resolve within the allowed rounds.
    #[display("Color negotiation timed out after {} rounds", rounds)]
    NegotiationTimeout {
        /// Rounds attempted.
        rounds: u32,
    },

    /// The peer refused our color.
    #[display("Color rejected by peer: {}", reason)]
    ColorRejected {
        /// Reason sent by the peer, possibly empty.
        reason: String,
    },

    /// The session actor is gone; commands can no longer be delivered.
    #[display("Session closed")]
    Closed,
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Transport(err)
    }
}

impl SessionError {
    /// Transport error for a stream that ended before it should have.
    pub fn unexpected_eof(context: &str) -> Self {
        SessionError::Transport(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("connection closed {context}"),
        ))
    }
}
