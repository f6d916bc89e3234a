//! In-memory view of a committed log, shared by both store backends.

use std::collections::{HashMap, HashSet};

use tradecore_types::{Result, SequenceId, TradecoreError};

use crate::{EventRecord, UniqueKeyRecord};

#[derive(Debug, Default)]
pub(crate) struct LogIndex {
    /// Ascending by sequence id.
    events: Vec<EventRecord>,
    uniques: HashMap<String, UniqueKeyRecord>,
}

impl LogIndex {
    pub(crate) fn max_sequence_id(&self) -> SequenceId {
        self.events.last().map_or(0, |e| e.sequence_id)
    }

    /// Reject a batch that would break uniqueness or the event chain.
    /// Nothing is modified.
    pub(crate) fn check(&self, uniques: &[UniqueKeyRecord], events: &[EventRecord]) -> Result<()> {
        let conflict = |reason: String| TradecoreError::StoreConflict { reason };

        let mut expected_previous = self.max_sequence_id();
        for event in events {
            if event.previous_id != expected_previous {
                return Err(conflict(format!(
                    "event {} links to {} but the log ends at {expected_previous}",
                    event.sequence_id, event.previous_id
                )));
            }
            if event.sequence_id <= expected_previous {
                return Err(conflict(format!(
                    "sequence id {} does not advance past {expected_previous}",
                    event.sequence_id
                )));
            }
            expected_previous = event.sequence_id;
        }

        let mut seen = HashSet::with_capacity(uniques.len());
        for unique in uniques {
            if self.uniques.contains_key(&unique.unique_id) || !seen.insert(&unique.unique_id) {
                return Err(conflict(format!("duplicate unique id {:?}", unique.unique_id)));
            }
            if !events.iter().any(|e| e.sequence_id == unique.sequence_id) {
                return Err(conflict(format!(
                    "unique id {:?} refers to sequence {} outside the batch",
                    unique.unique_id, unique.sequence_id
                )));
            }
        }
        Ok(())
    }

    /// Apply a batch that already passed [`check`](Self::check).
    pub(crate) fn apply(&mut self, uniques: &[UniqueKeyRecord], events: &[EventRecord]) {
        for unique in uniques {
            self.uniques.insert(unique.unique_id.clone(), unique.clone());
        }
        self.events.extend_from_slice(events);
    }

    pub(crate) fn has_unique_id(&self, unique_id: &str) -> bool {
        self.uniques.contains_key(unique_id)
    }

    pub(crate) fn load_after(&self, after: SequenceId, limit: usize) -> Vec<EventRecord> {
        let start = self.events.partition_point(|e| e.sequence_id <= after);
        self.events[start..].iter().take(limit).cloned().collect()
    }

    pub(crate) fn last(&self) -> Option<EventRecord> {
        self.events.last().cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }
}
