//! Session actor.
//!
//! All inputs (peer lines, local commands, transport loss, shutdown) are
//! funneled into one queue. A single task drains it and is the only code
//! that touches the [`Session`], so each event is applied completely
//! before the next one is looked at. Outbound lines go through a FIFO
//! drained by a writer task, which keeps them in the order they were
//! produced.

use crate::error::SessionError;
use crate::presentation::{Command, Notification};
use crate::protocol::{self, DecodeError, Inbound, Outbound};
use crate::transport::{self, Connection, LineReader};
use crate::turn::{Outcome, Session, TurnState};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// One unit of work for the session actor.
#[derive(Debug)]
pub enum SessionEvent {
    /// A decoded peer message.
    Inbound(Inbound),
    /// A peer line that names a known message but is malformed.
    DecodeFailed {
        /// The raw line.
        line: String,
        /// What was wrong with it.
        error: DecodeError,
    },
    /// A local command.
    Command(Command),
    /// The transport closed or failed.
    Disconnected(String),
    /// Local request to stop.
    Shutdown,
}

/// Starts the session actor.
pub struct Coordinator;

impl Coordinator {
    /// Spawns the reader, writer and actor tasks for a negotiated session.
    ///
    /// Returns a handle for sending commands and a stream of notifications.
    /// The stream ends once the actor has stopped.
    #[instrument(skip_all, fields(state = %session.state()))]
    pub fn start<R, W>(
        session: Session,
        connection: Connection<R, W>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<Notification>)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let (lines, writer) = connection.into_parts();
        let reader = tokio::spawn(receive_loop(lines, event_tx.clone()));
        let writer = tokio::spawn(send_loop(writer, outbound_rx, event_tx.clone()));

        let actor = SessionActor {
            session,
            events: event_rx,
            outbound: outbound_tx,
            notifications: notify_tx,
        };
        let task = tokio::spawn(actor.run(reader, writer));

        info!("Session actor started");
        (SessionHandle { events: event_tx, task }, notify_rx)
    }
}

/// Handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    task: JoinHandle<Result<Outcome, SessionError>>,
}

impl SessionHandle {
    /// Asks to drop a piece into `column`.
    pub fn request_placement(&self, column: usize) -> Result<(), SessionError> {
        self.submit(SessionEvent::Command(Command::RequestPlacement { column }))
    }

    /// Asks to end the current turn.
    pub fn request_end_turn(&self) -> Result<(), SessionError> {
        self.submit(SessionEvent::Command(Command::RequestEndTurn))
    }

    /// Asks the session to stop. The game ends as disconnected unless it
    /// is already over.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.submit(SessionEvent::Shutdown)
    }

    /// Waits for the actor to stop and returns how the game ended.
    pub async fn join(self) -> Result<Outcome, SessionError> {
        drop(self.events);
        self.task.await.unwrap_or_else(|err| {
            error!(%err, "Session actor panicked");
            Err(SessionError::Closed)
        })
    }

    fn submit(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events.send(event).map_err(|_| SessionError::Closed)
    }
}

struct SessionActor {
    session: Session,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    outbound: mpsc::UnboundedSender<Outbound>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl SessionActor {
    async fn run(
        mut self,
        reader: JoinHandle<()>,
        writer: JoinHandle<()>,
    ) -> Result<Outcome, SessionError> {
        let result = self.drain().await;

        reader.abort();
        let SessionActor {
            session, outbound, ..
        } = self;
        // Closing the FIFO lets the writer flush what is queued and stop.
        drop(outbound);
        if let Err(err) = writer.await {
            warn!(%err, "Writer task ended abnormally");
        }

        info!(state = %session.state(), "Session actor stopped");
        result
    }

    async fn drain(&mut self) -> Result<Outcome, SessionError> {
        while let Some(event) = self.events.recv().await {
            self.apply(event)?;
            if let TurnState::GameOver(outcome) = self.session.state() {
                return Ok(outcome);
            }
        }
        // Every sender is gone, so nothing can reach the session any more.
        let reaction = self.session.handle_disconnect("event queue closed");
        self.dispatch(reaction.outbound, reaction.notifications);
        Ok(Outcome::Disconnected)
    }

    #[instrument(skip(self), fields(state = %self.session.state()))]
    fn apply(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        let reaction = match event {
            SessionEvent::Inbound(message) => self.session.handle_inbound(message)?,
            SessionEvent::DecodeFailed { line, error } => {
                self.session.handle_decode_error(&line, &error)
            }
            SessionEvent::Command(command) => self.session.handle_command(command),
            SessionEvent::Disconnected(reason) => self.session.handle_disconnect(&reason),
            SessionEvent::Shutdown => self.session.handle_disconnect("local shutdown"),
        };
        self.dispatch(reaction.outbound, reaction.notifications);
        Ok(())
    }

    fn dispatch(&self, outbound: Vec<Outbound>, notifications: Vec<Notification>) {
        for message in outbound {
            if self.outbound.send(message).is_err() {
                debug!("Writer gone, dropping outbound message");
            }
        }
        for notification in notifications {
            if self.notifications.send(notification).is_err() {
                debug!("Notification receiver dropped");
            }
        }
    }
}

async fn receive_loop<R>(mut lines: LineReader<R>, events: mpsc::UnboundedSender<SessionEvent>)
where
    R: AsyncRead + Unpin,
{
    let reason = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break "connection closed by peer".to_string(),
            Err(err) => break format!("read failed: {err}"),
        };
        let event = match protocol::decode_bytes(&line) {
            Ok(Some(message)) => SessionEvent::Inbound(message),
            Ok(None) => continue,
            Err(error) => SessionEvent::DecodeFailed {
                line: String::from_utf8_lossy(&line).into_owned(),
                error,
            },
        };
        if events.send(event).is_err() {
            return;
        }
    };
    debug!(%reason, "Reader stopping");
    let _ = events.send(SessionEvent::Disconnected(reason));
}

async fn send_loop<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SessionEvent>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        if let Err(err) = transport::send_line(&mut writer, &protocol::encode(&message)).await {
            warn!(%err, %message, "Write failed");
            let _ = events.send(SessionEvent::Disconnected(format!("write failed: {err}")));
            return;
        }
    }
    if let Err(err) = writer.shutdown().await {
        debug!(%err, "Writer shutdown failed");
    }
}
