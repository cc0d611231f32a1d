// Controller ingestion: message sources, per-connection handler, TCP listener

mod handler;
mod listener;
mod simulator;
mod source;

pub use handler::{
    ConnectionEnd, ConnectionHandler, ConnectionSummary, HandlerOptions, Outcome,
};
pub use listener::Listener;
pub use simulator::{spawn_simulation, SimulatedSource};
pub use source::{MessageSource, SourceError, TcpSource};
