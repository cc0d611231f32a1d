use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One committed state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

/// Append-only, chronologically ordered record of committed states.
///
/// Entries are never removed or modified. Growth is unbounded for the
/// lifetime of the process.
pub struct HistoryLog {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append one entry at the end
    pub fn append(&self, label: impl Into<String>, timestamp: DateTime<Utc>) {
        let entry = HistoryEntry {
            timestamp,
            label: label.into(),
        };
        self.lock().push(entry);
    }

    /// Copy of the full sequence, oldest first.
    ///
    /// Later appends never touch the returned vector.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    /// Most recent entry, if any
    pub fn last(&self) -> Option<HistoryEntry> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
