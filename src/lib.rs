// Message code vocabulary
pub mod vocabulary;

// Current state cell and history log
pub mod state;

// Controller ingestion over TCP
pub mod ingest;

// Read-only views for pollers
pub mod query;

// HTTP query surface
pub mod api;

// Startup configuration
pub mod config;

pub use query::{HistoryOrder, QueryService};
pub use state::StateTracker;
pub use vocabulary::Vocabulary;
