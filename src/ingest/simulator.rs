use crate::config::SimulationConfig;
use crate::ingest::handler::{ConnectionHandler, ConnectionSummary, HandlerOptions};
use crate::ingest::source::{MessageSource, SourceError};
use crate::state::StateTracker;
use crate::vocabulary::Vocabulary;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Synthetic controller that reports a random known code at a fixed interval
pub struct SimulatedSource {
    codes: Vec<String>,
    interval: Duration,
    remaining: Option<u64>,
}

impl SimulatedSource {
    pub fn new(vocabulary: &Vocabulary, interval: Duration) -> Self {
        Self {
            codes: vocabulary.codes().into_iter().map(str::to_string).collect(),
            interval,
            remaining: None,
        }
    }

    /// Stop after `count` messages, as if the controller disconnected
    pub fn with_limit(mut self, count: u64) -> Self {
        self.remaining = Some(count);
        self
    }
}

#[async_trait]
impl MessageSource for SimulatedSource {
    fn peer(&self) -> &str {
        "simulator"
    }

    async fn next_message(&mut self) -> Result<Option<String>, SourceError> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut n) => *n -= 1,
            None => {}
        }

        tokio::time::sleep(self.interval).await;

        let code = self.codes.choose(&mut rand::thread_rng()).cloned();
        Ok(code)
    }

    async fn acknowledge(&mut self, _payload: &[u8]) -> Result<(), SourceError> {
        Ok(())
    }

    async fn close(&mut self) {}
}

/// Run the simulator through the regular connection handler
pub fn spawn_simulation(
    config: &SimulationConfig,
    vocabulary: Arc<Vocabulary>,
    tracker: Arc<StateTracker>,
) -> JoinHandle<ConnectionSummary> {
    let interval = Duration::from_secs(config.interval_seconds);
    info!(interval_seconds = config.interval_seconds, "Starting simulated controller");

    let source = SimulatedSource::new(&vocabulary, interval);
    let handler = ConnectionHandler::new(
        source,
        vocabulary,
        tracker,
        Arc::new(HandlerOptions::default()),
    );

    tokio::spawn(handler.run())
}
