//! Sequence assignment with durable, all-or-nothing batches.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use tradecore_store::{EventRecord, EventStore, UniqueKeyRecord};
use tradecore_types::{
    Event, EventRequest, Result, SequenceId, SequencerConfig, TradecoreError,
};

use crate::Clock;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    sequence_id: SequenceId,
    last_timestamp: i64,
}

/// Assigns the global event order.
///
/// `sequence` may be called from many threads; the cursor lock is held
/// across "read counter, assign, persist" so batches never interleave.
pub struct Sequencer {
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    config: SequencerConfig,
    cursor: Mutex<Cursor>,
}

impl Sequencer {
    /// Resume from the highest persisted event, or start at 0.
    pub fn new(
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
        config: SequencerConfig,
    ) -> Result<Self> {
        let cursor = match store.last_event()? {
            Some(last) => Cursor {
                sequence_id: last.sequence_id,
                last_timestamp: last.created_at,
            },
            None => Cursor {
                sequence_id: 0,
                last_timestamp: 0,
            },
        };
        info!(
            sequence_id = cursor.sequence_id,
            last_timestamp = cursor.last_timestamp,
            "sequencer recovered"
        );
        Ok(Self {
            store,
            clock,
            config,
            cursor: Mutex::new(cursor),
        })
    }

    /// Sequence and persist a batch. Returns the assigned events in batch
    /// order; requests with an already-used unique id are dropped.
    ///
    /// On error nothing was persisted and the counter did not move.
    pub fn sequence(&self, requests: Vec<EventRequest>) -> Result<Vec<Event>> {
        if requests.len() > self.config.max_batch_size {
            return Err(TradecoreError::InvalidBatch {
                reason: format!(
                    "{} requests exceed max batch size {}",
                    requests.len(),
                    self.config.max_batch_size
                ),
            });
        }

        let mut cursor = self.cursor.lock();

        let mut created_at = self.clock.now_millis();
        if created_at < cursor.last_timestamp {
            warn!(
                now = created_at,
                last = cursor.last_timestamp,
                "clock moved backwards, reusing last timestamp"
            );
            created_at = cursor.last_timestamp;
        }

        let mut sequence_id = cursor.sequence_id;
        let mut seen: HashSet<String> = HashSet::new();
        let mut events = Vec::with_capacity(requests.len());
        let mut records = Vec::with_capacity(requests.len());
        let mut uniques = Vec::new();

        for request in requests {
            if let Some(unique_id) = &request.unique_id {
                if seen.contains(unique_id) || self.store.has_unique_id(unique_id)? {
                    warn!(unique_id = %unique_id, "duplicate request dropped");
                    continue;
                }
                seen.insert(unique_id.clone());
            }

            let previous_id = sequence_id;
            sequence_id += 1;
            let event = Event {
                sequence_id,
                previous_id,
                unique_id: request.unique_id,
                created_at,
                payload: request.payload,
            };
            if let Some(unique_id) = &event.unique_id {
                uniques.push(UniqueKeyRecord {
                    unique_id: unique_id.clone(),
                    sequence_id,
                    created_at,
                });
            }
            records.push(EventRecord::from_event(&event)?);
            events.push(event);
        }

        if events.is_empty() {
            return Ok(events);
        }

        self.store.append(&uniques, &records)?;
        cursor.sequence_id = sequence_id;
        cursor.last_timestamp = created_at;
        debug!(
            first = events[0].sequence_id,
            last = sequence_id,
            count = events.len(),
            "batch sequenced"
        );
        Ok(events)
    }

    /// Sequence id of the last persisted event.
    #[must_use]
    pub fn last_sequence_id(&self) -> SequenceId {
        self.cursor.lock().sequence_id
    }

    #[must_use]
    pub fn last_timestamp(&self) -> i64 {
        self.cursor.lock().last_timestamp
    }
}
