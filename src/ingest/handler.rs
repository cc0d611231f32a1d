use crate::ingest::source::{MessageSource, SourceError};
use crate::state::{HistoryEntry, StateTracker};
use crate::vocabulary::Vocabulary;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-connection acknowledgment policy
#[derive(Clone, Debug)]
pub struct HandlerOptions {
    /// Bytes sent back after a message is handled
    pub ack_payload: Vec<u8>,
    /// Also acknowledge codes missing from the vocabulary
    pub ack_invalid: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            ack_payload: b"OK".to_vec(),
            ack_invalid: false,
        }
    }
}

/// Result of handling one message code
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Committed(HistoryEntry),
    Rejected,
}

/// How a connection ended
#[derive(Debug)]
pub enum ConnectionEnd {
    PeerClosed,
    Failed(SourceError),
}

/// What a handler did over its connection's lifetime
#[derive(Debug)]
pub struct ConnectionSummary {
    pub peer: String,
    pub committed: u64,
    pub rejected: u64,
    pub end: ConnectionEnd,
}

/// Owns one message source end-to-end: read, validate, commit, acknowledge.
pub struct ConnectionHandler<S> {
    source: S,
    vocabulary: Arc<Vocabulary>,
    tracker: Arc<StateTracker>,
    options: Arc<HandlerOptions>,
}

impl<S: MessageSource> ConnectionHandler<S> {
    pub fn new(
        source: S,
        vocabulary: Arc<Vocabulary>,
        tracker: Arc<StateTracker>,
        options: Arc<HandlerOptions>,
    ) -> Self {
        Self {
            source,
            vocabulary,
            tracker,
            options,
        }
    }

    /// Validate one code and commit it if it is known
    pub fn process(&self, code: &str) -> Outcome {
        match self.vocabulary.lookup(code) {
            Some(label) => {
                let entry = self.tracker.commit(label);
                info!(
                    peer = %self.source.peer(),
                    code = %code,
                    label = %entry.label,
                    "New box state"
                );
                Outcome::Committed(entry)
            }
            None => {
                warn!(
                    peer = %self.source.peer(),
                    message = %code,
                    "Unrecognised message from controller"
                );
                Outcome::Rejected
            }
        }
    }

    /// Drive the source until the peer closes or the connection fails.
    ///
    /// The source is closed exactly once on every exit path. Failures are
    /// reported in the summary and never propagate to the caller.
    pub async fn run(mut self) -> ConnectionSummary {
        let mut committed = 0;
        let mut rejected = 0;

        let end = loop {
            let code = match self.source.next_message().await {
                Ok(Some(code)) => code,
                Ok(None) => break ConnectionEnd::PeerClosed,
                Err(e) => break ConnectionEnd::Failed(e),
            };

            let acknowledge = match self.process(&code) {
                Outcome::Committed(_) => {
                    committed += 1;
                    true
                }
                Outcome::Rejected => {
                    rejected += 1;
                    self.options.ack_invalid
                }
            };

            // Locks are released by now; the send happens outside them
            if acknowledge {
                if let Err(e) = self.source.acknowledge(&self.options.ack_payload).await {
                    break ConnectionEnd::Failed(e);
                }
            }
        };

        self.source.close().await;

        ConnectionSummary {
            peer: self.source.peer().to_string(),
            committed,
            rejected,
            end,
        }
    }
}
