use crate::config::IngestConfig;
use crate::ingest::handler::{ConnectionEnd, ConnectionHandler, HandlerOptions};
use crate::ingest::source::TcpSource;
use crate::state::StateTracker;
use crate::vocabulary::Vocabulary;
use anyhow::{Context, Result};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Accepts controller connections and spawns one handler task per connection
pub struct Listener {
    listener: TcpListener,
    vocabulary: Arc<Vocabulary>,
    tracker: Arc<StateTracker>,
    options: Arc<HandlerOptions>,
    read_buffer: usize,
    idle_timeout: Option<Duration>,
}

impl Listener {
    /// Bind the ingestion socket.
    ///
    /// Failure here is a startup error for the ingestion side only.
    pub async fn bind(
        config: &IngestConfig,
        vocabulary: Arc<Vocabulary>,
        tracker: Arc<StateTracker>,
    ) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to bind controller socket on {}:{}",
                    config.host, config.port
                )
            })?;

        info!(
            host = %config.host,
            port = config.port,
            codes = vocabulary.len(),
            "Waiting for controller connections"
        );

        Ok(Self {
            listener,
            vocabulary,
            tracker,
            options: Arc::new(config.handler_options()),
            read_buffer: config.read_buffer_bytes,
            idle_timeout: config.idle_timeout(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the process exits.
    ///
    /// Never blocks on per-connection I/O; each connection runs in its own task.
    pub async fn run(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "Transient accept failure, continuing");
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "Accept failed, retrying in 1s");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            info!(peer = %peer, "Controller connected");

            let source = TcpSource::new(stream, peer, self.read_buffer, self.idle_timeout);
            let handler = ConnectionHandler::new(
                source,
                Arc::clone(&self.vocabulary),
                Arc::clone(&self.tracker),
                Arc::clone(&self.options),
            );

            tokio::spawn(async move {
                let summary = handler.run().await;
                match summary.end {
                    ConnectionEnd::PeerClosed => info!(
                        peer = %summary.peer,
                        committed = summary.committed,
                        rejected = summary.rejected,
                        "Controller disconnected"
                    ),
                    ConnectionEnd::Failed(e) => warn!(
                        peer = %summary.peer,
                        committed = summary.committed,
                        rejected = summary.rejected,
                        error = %e,
                        "Controller connection dropped"
                    ),
                }
            });
        }
    }
}

/// Errors tied to a single pending connection rather than the listening socket
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
