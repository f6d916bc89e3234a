//! Rows of the event table and the unique-key table.

use serde::{Deserialize, Serialize};
use tradecore_types::{Event, Result, SequenceId};

/// One persisted event. `data` is the JSON form of the full [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence_id: SequenceId,
    pub previous_id: SequenceId,
    pub data: String,
    pub created_at: i64,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Result<Self> {
        Ok(Self {
            sequence_id: event.sequence_id,
            previous_id: event.previous_id,
            data: event.to_json()?,
            created_at: event.created_at,
        })
    }

    /// Decode the stored event.
    pub fn to_event(&self) -> Result<Event> {
        Event::from_json(&self.data)
    }
}

/// A consumed idempotency key and the event it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKeyRecord {
    pub unique_id: String,
    pub sequence_id: SequenceId,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use tradecore_types::*;

    use super::*;

    #[test]
    fn record_decodes_to_same_event() {
        let event = Event::chained(
            3,
            1_700_000_000_000,
            EventPayload::OrderCancel {
                user_id: UserId(1000),
                order_id: OrderId(1_202_403),
            },
        );
        let record = EventRecord::from_event(&event).unwrap();
        assert_eq!(record.sequence_id, 3);
        assert_eq!(record.previous_id, 2);
        assert_eq!(record.created_at, 1_700_000_000_000);
        assert_eq!(record.to_event().unwrap(), event);
    }

    #[test]
    fn garbage_data_fails_to_decode() {
        let record = EventRecord {
            sequence_id: 1,
            previous_id: 0,
            data: "{\"type\":\"NOPE\"}".into(),
            created_at: 0,
        };
        assert!(record.to_event().is_err());
    }
}
