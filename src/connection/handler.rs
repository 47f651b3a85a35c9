//! Connection Handler Module
//!
//! This module handles individual client connections to the server.
//! Each client gets its own handler task that runs in a loop,
//! reading lines and sending responses.
//!
//! ## Connection Lifecycle
//!
//! ```text
//!          accept()
//!             │
//!             ▼
//!   ┌──────────────────┐   line    ┌──────────────────┐
//!   │  AWAITING_LINE   │──────────>│    PROCESSING    │
//!   │ (read until \n)  │<──────────│ parse/exec/reply │
//!   └────────┬─────────┘  continue └────────┬─────────┘
//!            │ EOF / read error             │ QUIT
//!            ▼                              ▼
//!   ┌─────────────────────────────────────────────────┐
//!   │                     CLOSED                      │
//!   └─────────────────────────────────────────────────┘
//! ```
//!
//! One line is fully handled (parsed, executed, answered, flushed) before the
//! next one is looked at, so effects are strictly ordered per connection.
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut`. TCP is a stream, so a read may
//! hold half a line or several lines; complete lines are split off the front
//! and anything after the last `\n` waits for the next read. The
//! `LineDecoder` remembers how much of the pending tail it has searched, so a
//! long line spread over many reads is scanned once. Bytes still buffered
//! when the peer closes are dropped unprocessed.

use crate::commands::{CommandError, CommandHandler};
use crate::protocol::{parse_request, LineDecoder, Response};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// What to do after a line has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Go back to waiting for the next line
    Continue,
    /// Close the connection
    Close,
}

/// Handles a single client connection.
///
/// Generic over the byte stream so it runs the same over a `TcpStream` and
/// over an in-memory mock.
pub struct ConnectionHandler<S> {
    /// The client stream, with buffered writes
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes read but not yet consumed as lines
    buffer: BytesMut,

    /// Line framer for `buffer`
    decoder: LineDecoder,

    /// Executes requests against the shared store
    command_handler: CommandHandler,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client byte stream
    /// * `addr` - The client's socket address
    /// * `command_handler` - Executor bound to the shared store and statistics
    pub fn new(stream: S, addr: SocketAddr, command_handler: CommandHandler) -> Self {
        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            decoder: LineDecoder::new(),
            command_handler,
        }
    }

    /// Runs the connection until the client quits, disconnects, or fails.
    ///
    /// `Ok(())` means the connection ended with `QUIT`.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client quit"),
            Err(ConnectionError::ClientDisconnected) => {
                info!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::UnexpectedEof { pending }) => {
                debug!(client = %self.addr, pending, "Client disconnected mid-line")
            }
            Err(ConnectionError::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        result
    }

    /// The read-process-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.decoder.next_line(&mut self.buffer) {
                if self.process_line(line).await? == Flow::Close {
                    return Ok(());
                }
            }

            self.read_more_data().await?;
        }
    }

    /// Handles one complete line and writes exactly one response for it.
    ///
    /// Blank lines are skipped without a response and are not counted.
    async fn process_line(&mut self, line: Bytes) -> Result<Flow, ConnectionError> {
        if line.is_empty() {
            trace!(client = %self.addr, "Skipping blank line");
            return Ok(Flow::Continue);
        }

        self.command_handler.stats().request_received();

        let (response, flow) = match parse_request(&line) {
            Ok(request) => {
                trace!(client = %self.addr, command = request.name(), "Executing");
                let flow = if request.is_quit() {
                    Flow::Close
                } else {
                    Flow::Continue
                };
                (self.command_handler.execute(request)?, flow)
            }
            Err(e) => {
                debug!(client = %self.addr, error = %e, "Rejected request");
                (Response::from(e), Flow::Continue)
            }
        };

        self.send_response(&response).await?;
        Ok(flow)
    }

    /// Reads more data from the stream into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::ClientDisconnected)
            } else {
                Err(ConnectionError::UnexpectedEof {
                    pending: self.buffer.len(),
                })
            };
        }

        trace!(client = %self.addr, bytes = n, "Read data");
        Ok(())
    }

    /// Writes and flushes one response line.
    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        trace!(
            client = %self.addr,
            status = response.status(),
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that end a connection.
///
/// Protocol errors are not here: they are answered in-band and the
/// connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client closed the connection between lines
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Client closed the connection with a partial line buffered
    #[error("Unexpected end of stream with {pending} bytes of an unterminated line")]
    UnexpectedEof { pending: usize },

    /// A command failed to execute
    #[error("Command failed: {0}")]
    Command(#[from] CommandError),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. The stream is closed when this returns.
pub async fn handle_connection<S>(stream: S, addr: SocketAddr, command_handler: CommandHandler)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler);
    if let Err(e) = handler.run().await {
        trace!(client = %addr, error = %e, "Connection ended");
    }
}
