use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Failures that end a single connection
#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Decode(std::str::Utf8Error),
    IdleTimeout(Duration),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "connection error: {}", e),
            SourceError::Decode(e) => write!(f, "message is not valid UTF-8: {}", e),
            SourceError::IdleTimeout(limit) => {
                write!(f, "no data received for {}s", limit.as_secs())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            SourceError::Decode(e) => Some(e),
            SourceError::IdleTimeout(_) => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

/// Producer of message codes for a connection handler.
///
/// A real socket and a synthetic generator both implement this, so they
/// share the same commit path.
#[async_trait]
pub trait MessageSource: Send {
    /// Identity used in log lines (socket address, "simulator", ...)
    fn peer(&self) -> &str;

    /// Next trimmed message code.
    ///
    /// `Ok(None)` means the peer closed cleanly.
    async fn next_message(&mut self) -> Result<Option<String>, SourceError>;

    /// Send an acknowledgment back to the producer
    async fn acknowledge(&mut self, payload: &[u8]) -> Result<(), SourceError>;

    /// Release the underlying resource. Called exactly once by the handler.
    async fn close(&mut self);
}

/// Message source over an accepted TCP connection.
///
/// There is no delimiter framing: each successful read of up to
/// `read_buffer` bytes is one message. A fast peer can merge two codes into
/// one read and a slow one can split a code; both then fail the vocabulary
/// lookup and are logged as unrecognised.
pub struct TcpSource {
    stream: TcpStream,
    peer: String,
    buf: Vec<u8>,
    idle_timeout: Option<Duration>,
}

impl TcpSource {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        read_buffer: usize,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            stream,
            peer: peer.to_string(),
            buf: vec![0; read_buffer],
            idle_timeout,
        }
    }
}

#[async_trait]
impl MessageSource for TcpSource {
    fn peer(&self) -> &str {
        &self.peer
    }

    async fn next_message(&mut self) -> Result<Option<String>, SourceError> {
        let idle_timeout = self.idle_timeout;
        let read = self.stream.read(&mut self.buf);

        let n = match idle_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| SourceError::IdleTimeout(limit))??,
            None => read.await?,
        };

        if n == 0 {
            return Ok(None);
        }

        let text = std::str::from_utf8(&self.buf[..n]).map_err(SourceError::Decode)?;
        Ok(Some(text.trim().to_string()))
    }

    async fn acknowledge(&mut self, payload: &[u8]) -> Result<(), SourceError> {
        self.stream.write_all(payload).await?;
        Ok(())
    }

    async fn close(&mut self) {
        // Peer may already be gone; the socket is released on drop either way
        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "Socket shutdown failed");
        }
    }
}
