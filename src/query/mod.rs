// Read-only views over the current state and history

use crate::state::{CurrentState, HistoryEntry, StateTracker};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;


/// Wall-clock format used on the wire and in the history page
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in local time for human readers
pub fn display_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(DISPLAY_TIME_FORMAT).to_string()
}

/// Ordering of history listings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryOrder {
    #[default]
    #[serde(rename = "newest")]
    NewestFirst,
    #[serde(rename = "oldest")]
    OldestFirst,
}

/// Current state as seen by a poller
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurrentStateView {
    pub status: &'static str,
    pub label: String,
    pub observed_at: DateTime<Utc>,
    pub queried_at: DateTime<Utc>,
}

/// History listing with the current state it was taken alongside
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub current: CurrentState,
    pub order: HistoryOrder,
    pub entries: Vec<HistoryEntry>,
}

/// Read-only access for external pollers.
///
/// Only ever takes snapshots; never writes to the tracker.
#[derive(Clone)]
pub struct QueryService {
    tracker: Arc<StateTracker>,
}

impl QueryService {
    pub fn new(tracker: Arc<StateTracker>) -> Self {
        Self { tracker }
    }

    pub fn current_state_view(&self) -> CurrentStateView {
        let current = self.tracker.current();
        CurrentStateView {
            status: "OK",
            label: current.label,
            observed_at: current.observed_at,
            queried_at: Utc::now(),
        }
    }

    /// Full history plus the matching current state, taken together
    pub fn history_view(&self, order: HistoryOrder) -> HistoryView {
        let (current, mut entries) = self.tracker.consistent_snapshot();
        if order == HistoryOrder::NewestFirst {
            entries.reverse();
        }
        HistoryView {
            current,
            order,
            entries,
        }
    }
}
