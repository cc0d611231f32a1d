// Current state cell, history log and the combined commit over both

mod history;
mod store;
mod tracker;

pub use history::{HistoryEntry, HistoryLog};
pub use store::{CurrentState, StateStore};
pub use tracker::StateTracker;
