//! The pinned snapshot of candidate objects.
//!
//! Pinning fixes the candidate set at one point in time so refresh ticks
//! re-query only those objects instead of re-walking the whole tree. The
//! set is replaced wholesale on each pin, never merged; a dead entry is
//! excluded from a round's output but stays in the set.

use std::collections::HashSet;

use tracing::debug;

use ax_adapter::{AxNodeHandle, UiNode};
use perceiver_progress::ProgressCandidate;

/// Ordered, deduplicated set of pinned objects.
#[derive(Default)]
pub struct PinnedSet {
    entries: Vec<AxNodeHandle>,
}

impl PinnedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole set with the given candidates, keyed by the
    /// composite (name, role, window class); later duplicates are dropped.
    /// Returns the resulting size.
    pub fn replace_with(&mut self, candidates: &[ProgressCandidate]) -> usize {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for candidate in candidates {
            let key = candidate.node.key();
            if seen.insert(key) {
                entries.push(candidate.node.clone());
            }
        }
        debug!(
            pinned = entries.len(),
            dropped = candidates.len() - entries.len(),
            "pinned set replaced"
        );
        self.entries = entries;
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries that still answer a cheap liveness probe, in pin order.
    /// Dead entries are skipped for this round but not removed.
    pub fn live(&self) -> Vec<AxNodeHandle> {
        self.entries
            .iter()
            .filter(|node| node.is_alive())
            .cloned()
            .collect()
    }
}
