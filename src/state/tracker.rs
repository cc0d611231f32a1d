use crate::state::history::{HistoryEntry, HistoryLog};
use crate::state::store::{CurrentState, StateStore};
use chrono::Utc;
use tracing::debug;

/// Owns the state cell and the history log and keeps them in step.
///
/// Lock order is always state, then history. Commits hold both guards while
/// writing, so a reader that takes the same pair sees either both halves of a
/// commit or neither.
pub struct StateTracker {
    state: StateStore,
    history: HistoryLog,
    sentinel: String,
}

impl StateTracker {
    /// Create a tracker holding the sentinel label.
    ///
    /// With `seed_history` the log starts with one sentinel entry, so the
    /// last history label always matches the current label.
    pub fn new(sentinel: impl Into<String>, seed_history: bool) -> Self {
        let sentinel = sentinel.into();
        let started_at = Utc::now();
        let history = HistoryLog::new();
        if seed_history {
            history.append(sentinel.clone(), started_at);
        }

        Self {
            state: StateStore::new(sentinel.clone(), started_at),
            history,
            sentinel,
        }
    }

    /// Commit a recognised state as one unit across both stores
    pub fn commit(&self, label: &str) -> HistoryEntry {
        let label = label.to_string();

        let mut state = self.state.lock();
        let mut history = self.history.lock();

        // Stamped under the guards so history order and timestamp order agree
        let now = Utc::now();
        let entry = HistoryEntry {
            timestamp: now,
            label: label.clone(),
        };
        *state = CurrentState {
            label,
            observed_at: now,
        };
        history.push(entry.clone());

        drop(history);
        drop(state);

        debug!(label = %entry.label, "State committed");
        entry
    }

    /// Current state and full history taken under both locks
    pub fn consistent_snapshot(&self) -> (CurrentState, Vec<HistoryEntry>) {
        let state = self.state.lock();
        let history = self.history.lock();
        (state.clone(), history.clone())
    }

    pub fn current(&self) -> CurrentState {
        self.state.get()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Label reported before any message has been committed
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}
