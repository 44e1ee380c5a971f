//! Progress tally across `track_progress` calls
//!
//! Accumulates task names reported during the life of the server. Once the
//! number of recorded calls reaches the threshold the tally is drained and
//! the caller writes one extra auto-saved progress block.

use crate::types::ProgressSnapshot;

/// Calls between automatic progress saves
pub const DEFAULT_AUTO_SAVE_THRESHOLD: usize = 10;

/// Accumulated progress for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTally {
    threshold: usize,
    calls: usize,
    completed: Vec<String>,
    in_progress: Vec<String>,
    blocked: Vec<String>,
}

impl Default for ProgressTally {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_SAVE_THRESHOLD)
    }
}

impl ProgressTally {
    /// A threshold of zero is treated as one
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            calls: 0,
            completed: Vec::new(),
            in_progress: Vec::new(),
            blocked: Vec::new(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Calls recorded since the last drain
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn is_empty(&self) -> bool {
        self.calls == 0
            && self.completed.is_empty()
            && self.in_progress.is_empty()
            && self.blocked.is_empty()
    }

    /// Record one snapshot. Returns the drained accumulation when this call
    /// reaches the threshold.
    pub fn record(&mut self, snapshot: &ProgressSnapshot) -> Option<ProgressSnapshot> {
        insert_unique(&mut self.completed, &snapshot.completed);
        insert_unique(&mut self.in_progress, &snapshot.in_progress);
        insert_unique(&mut self.blocked, snapshot.blocked_items());
        self.calls += 1;

        if self.calls >= self.threshold {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Take everything accumulated so far and reset the tally
    pub fn drain(&mut self) -> ProgressSnapshot {
        self.calls = 0;
        let blocked = std::mem::take(&mut self.blocked);
        ProgressSnapshot {
            completed: std::mem::take(&mut self.completed),
            in_progress: std::mem::take(&mut self.in_progress),
            blocked: (!blocked.is_empty()).then_some(blocked),
        }
    }

    /// Current accumulation without draining
    pub fn pending(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.clone(),
            in_progress: self.in_progress.clone(),
            blocked: (!self.blocked.is_empty()).then(|| self.blocked.clone()),
        }
    }
}

/// Set insertion that keeps first-seen order
fn insert_unique(set: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !set.contains(item) {
            set.push(item.clone());
        }
    }
}
