use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Latest known box state and when it was observed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurrentState {
    pub label: String,
    pub observed_at: DateTime<Utc>,
}

/// Single process-wide current-state cell.
///
/// Guarded by a plain mutex: every critical section is one clone or one
/// assignment, so readers and writers never hold it across I/O.
pub struct StateStore {
    current: Mutex<CurrentState>,
}

impl StateStore {
    /// Create the store holding the sentinel label
    pub fn new(sentinel: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(CurrentState {
                label: sentinel.into(),
                observed_at: started_at,
            }),
        }
    }

    /// Replace the current state unconditionally
    pub fn set(&self, label: impl Into<String>, timestamp: DateTime<Utc>) {
        let next = CurrentState {
            label: label.into(),
            observed_at: timestamp,
        };
        *self.lock() = next;
    }

    /// Snapshot of the current state
    pub fn get(&self) -> CurrentState {
        self.lock().clone()
    }

    // A poisoned guard still holds a whole value: writes are single assignments.
    pub(crate) fn lock(&self) -> MutexGuard<'_, CurrentState> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
