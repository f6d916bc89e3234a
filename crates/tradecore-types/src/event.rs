//! Sequenced events, the only input that mutates engine state.
//!
//! A client submits an [`EventRequest`]; the sequencer turns it into an
//! immutable [`Event`] by assigning `sequence_id`, `previous_id` and
//! `created_at`. The `previous_id` of every event equals the `sequence_id`
//! of the event before it, which lets the engine detect gaps and duplicates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetKind, Direction, OrderId, Result, SequenceId, TradecoreError, UserId};

/// Direction of a ledger transfer relative to the debt account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferDirection {
    /// Debt account → user, without a balance check on the debt side.
    Deposit,
    /// User → debt account, requires sufficient available balance.
    Withdraw,
}

/// The state-changing content of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderRequest {
        user_id: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
    },
    OrderCancel {
        user_id: UserId,
        order_id: OrderId,
    },
    Transfer {
        user_id: UserId,
        asset: AssetKind,
        amount: Decimal,
        direction: TransferDirection,
    },
}

impl EventPayload {
    /// Short name used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderRequest { .. } => "ORDER_REQUEST",
            Self::OrderCancel { .. } => "ORDER_CANCEL",
            Self::Transfer { .. } => "TRANSFER",
        }
    }
}

/// A request waiting to be sequenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    /// Client-supplied idempotency token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    pub payload: EventPayload,
}

impl EventRequest {
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            unique_id: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }
}

/// A sequenced, immutable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub sequence_id: SequenceId,
    pub previous_id: SequenceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Assignment timestamp, milliseconds since UNIX epoch.
    pub created_at: i64,
    pub payload: EventPayload,
}

impl Event {
    /// Serialize to the JSON form stored in the event log.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(TradecoreError::from)
    }

    /// Parse the JSON form stored in the event log.
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(TradecoreError::from)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event[{} <- {}] {}",
            self.sequence_id,
            self.previous_id,
            self.payload.kind()
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Event {
    /// An event with `previous_id = sequence_id - 1`.
    pub fn chained(sequence_id: SequenceId, created_at: i64, payload: EventPayload) -> Self {
        Self {
            sequence_id,
            previous_id: sequence_id.saturating_sub(1),
            unique_id: None,
            created_at,
            payload,
        }
    }
}
