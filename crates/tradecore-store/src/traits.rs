//! The persistence contract shared by the sequencer and the trading engine.

use tradecore_types::{Result, SequenceId};

use crate::{EventRecord, UniqueKeyRecord};

/// Append-only event log plus idempotency-key table.
///
/// Implementations must be safe to share between the sequencer (writer)
/// and the trading engine (gap-recovery reader).
pub trait EventStore: Send + Sync {
    /// Persist a batch of unique keys and events as one atomic unit.
    ///
    /// The batch is rejected with `StoreConflict` if any unique id already
    /// exists or repeats, or if the events do not continue the chain:
    /// the first `previous_id` must equal the current maximum sequence id
    /// and each following event must link to the one before it.
    fn append(&self, uniques: &[UniqueKeyRecord], events: &[EventRecord]) -> Result<()>;

    /// Whether an idempotency key has already been consumed.
    fn has_unique_id(&self, unique_id: &str) -> Result<bool>;

    /// Events with `sequence_id > after`, ascending, at most `limit`.
    fn load_events_after(&self, after: SequenceId, limit: usize) -> Result<Vec<EventRecord>>;

    /// The event with the highest sequence id.
    fn last_event(&self) -> Result<Option<EventRecord>>;

    /// Highest persisted sequence id, or 0 for an empty store.
    fn max_sequence_id(&self) -> Result<SequenceId> {
        Ok(self.last_event()?.map_or(0, |e| e.sequence_id))
    }
}
