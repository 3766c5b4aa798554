//! Line-framed byte stream to the peer.

use crate::protocol::{self, Outbound};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info, instrument, trace};

/// Splits a byte stream on `\n` without assuming the bytes are UTF-8.
///
/// A line that fails to decode is still a complete frame, so the caller
/// can report it and keep reading. Partial reads stay buffered across
/// calls, which makes [`LineReader::next_line`] safe to race in
/// `select!` or under a timeout.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::new(),
        }
    }

    /// Reads the next line without its `\n` or `\r\n` terminator.
    ///
    /// Returns `None` at end of stream. A final line with no terminator is
    /// still returned.
    pub async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let read = self.reader.read_until(b'\n', &mut self.buffer).await?;
        if read == 0 && self.buffer.is_empty() {
            return Ok(None);
        }
        let mut line = std::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        trace!(line = %String::from_utf8_lossy(&line), "recv");
        Ok(Some(line))
    }
}

/// A connection split into a line reader and a writer.
///
/// Generic so tests can run over [`tokio::io::duplex`].
#[derive(Debug)]
pub struct Connection<R, W> {
    lines: LineReader<R>,
    writer: W,
}

/// TCP connection.
pub type TcpConnection = Connection<OwnedReadHalf, OwnedWriteHalf>;

impl TcpConnection {
    /// Opens a TCP connection to `host:port`.
    #[instrument]
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        info!(peer = ?stream.peer_addr().ok(), "Connected");
        let (read, write) = stream.into_split();
        Ok(Connection::new(read, write))
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: LineReader::new(reader),
            writer,
        }
    }

    /// Reads the next raw line, without its terminator. `None` on end of
    /// stream.
    pub async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        self.lines.next_line().await
    }

    /// Encodes and sends one message.
    pub async fn send(&mut self, message: &Outbound) -> std::io::Result<()> {
        send_line(&mut self.writer, &protocol::encode(message)).await
    }

    /// Closes the write side.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        debug!("Shutting down writer");
        self.writer.shutdown().await
    }

    /// Splits back into the line reader and the writer.
    pub fn into_parts(self) -> (LineReader<R>, W) {
        (self.lines, self.writer)
    }
}

/// Writes `line` followed by `\n` and flushes.
pub async fn send_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    trace!(line, "send");
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
