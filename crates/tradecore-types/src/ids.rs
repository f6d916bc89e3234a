//! Identifiers used throughout tradecore.
//!
//! Every identifier is a plain integer. Order ids are derived from the
//! sequence id of the event that created them, so replaying the same event
//! stream always yields the same ids.

use std::fmt;

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

use crate::constants;

/// Position of an event in the global total order assigned by the sequencer.
pub type SequenceId = u64;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Unique identifier for a user / trading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// The system debt account.
    pub const DEBT: Self = Self(constants::DEBT_USER_ID);

    #[must_use]
    pub fn is_debt(self) -> bool {
        self == Self::DEBT
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_debt() {
            write!(f, "user:debt")
        } else {
            write!(f, "user:{}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Unique order identifier, derived from the creating event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Deterministic `OrderId` from the sequence id and creation time
    /// (milliseconds since UNIX epoch, interpreted in UTC).
    ///
    /// Ids are strictly increasing with the sequence id as long as event
    /// timestamps are non-decreasing, which the sequencer guarantees.
    #[must_use]
    pub fn derive(sequence_id: SequenceId, created_at_ms: i64) -> Self {
        let year_month = DateTime::from_timestamp_millis(created_at_ms).map_or(0, |dt| {
            u64::try_from(dt.year()).unwrap_or(0) * 100 + u64::from(dt.month())
        });
        Self(sequence_id * constants::ORDER_ID_SEQUENCE_FACTOR + year_month)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
