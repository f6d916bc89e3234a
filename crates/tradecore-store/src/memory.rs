//! In-memory event store.
//!
//! Non-persistent: the log is lost on restart. Used by tests and by nodes
//! started without a journal path.

use parking_lot::RwLock;
use tracing::debug;
use tradecore_types::{Result, SequenceId};

use crate::index::LogIndex;
use crate::{EventRecord, EventStore, UniqueKeyRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    log: RwLock<LogIndex>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for MemoryStore {
    fn append(&self, uniques: &[UniqueKeyRecord], events: &[EventRecord]) -> Result<()> {
        let mut log = self.log.write();
        log.check(uniques, events)?;
        log.apply(uniques, events);
        debug!(events = events.len(), uniques = uniques.len(), "batch appended");
        Ok(())
    }

    fn has_unique_id(&self, unique_id: &str) -> Result<bool> {
        Ok(self.log.read().has_unique_id(unique_id))
    }

    fn load_events_after(&self, after: SequenceId, limit: usize) -> Result<Vec<EventRecord>> {
        Ok(self.log.read().load_after(after, limit))
    }

    fn last_event(&self) -> Result<Option<EventRecord>> {
        Ok(self.log.read().last())
    }
}
