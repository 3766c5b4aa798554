//! Opening handshake: name, color proposal and acceptance.
//!
//! Each round waits up to the configured round timeout for one line. A
//! round that times out or carries a line that does not settle the color
//! counts against the limit. `SEND_COLOR` gets the proposal again.

use crate::config::NegotiationConfig;
use crate::error::SessionError;
use crate::presentation::Notification;
use crate::protocol::{self, Outbound};
use crate::transport::Connection;
use crate::turn::{Session, TurnState};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

/// Introduces us and negotiates our color.
///
/// On success the session is in [`TurnState::AwaitingRole`] and the
/// returned notifications are those produced along the way (for example
/// the opponent's color). On failure the writer has been shut down.
#[instrument(skip(session, connection, settings), fields(color = %session.local_color()))]
pub async fn negotiate<R, W>(
    session: &mut Session,
    connection: &mut Connection<R, W>,
    name: &str,
    settings: &NegotiationConfig,
) -> Result<Vec<Notification>, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let result = run(session, connection, name, settings).await;
    if let Err(err) = &result {
        error!(%err, "Negotiation failed");
        if let Err(close) = connection.shutdown().await {
            debug!(%close, "Writer already closed");
        }
    }
    result
}

async fn run<R, W>(
    session: &mut Session,
    connection: &mut Connection<R, W>,
    name: &str,
    settings: &NegotiationConfig,
) -> Result<Vec<Notification>, SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    connection.send(&Outbound::Hello(name.to_string())).await?;
    for message in session.announce().outbound {
        connection.send(&message).await?;
    }

    let mut notifications = Vec::new();
    let max_rounds = *settings.max_rounds();

    for round in 1..=max_rounds {
        let line = match timeout(settings.round_timeout(), connection.next_line()).await {
            Err(_) => {
                debug!(round, "No reply this round");
                continue;
            }
            Ok(read) => read?.ok_or_else(|| SessionError::unexpected_eof("during negotiation"))?,
        };

        let reaction = match protocol::decode_bytes(&line) {
            Ok(Some(message)) => session.handle_inbound(message)?,
            Ok(None) => {
                debug!(round, line = %String::from_utf8_lossy(&line), "Ignoring line during negotiation");
                continue;
            }
            Err(err) => session.handle_decode_error(&String::from_utf8_lossy(&line), &err),
        };

        for message in &reaction.outbound {
            connection.send(message).await?;
        }
        notifications.extend(reaction.notifications);

        if session.state() == TurnState::AwaitingRole {
            info!(round, "Color negotiated");
            return Ok(notifications);
        }
    }

    Err(SessionError::NegotiationTimeout { rounds: max_rounds })
}
