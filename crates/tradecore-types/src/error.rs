//! Error types for the tradecore exchange core.
//!
//! All errors use the `TC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Balance errors
//! - 3xx: Sequencing errors
//! - 4xx: Engine / event-chain errors
//! - 5xx: Validation errors
//! - 6xx: Store errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{OrderId, SequenceId};

/// Central error enum for all tradecore operations.
#[derive(Debug, Error)]
pub enum TradecoreError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The requested order was not found in the book or the active index.
    #[error("TC_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed validation (non-positive price or quantity).
    #[error("TC_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An order with this ID already exists.
    #[error("TC_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough available balance to perform the operation.
    #[error("TC_ERR_200: Insufficient available balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// Not enough frozen balance to unfreeze or settle.
    #[error("TC_ERR_201: Insufficient frozen balance: need {needed}, have {frozen}")]
    InsufficientFrozen { needed: Decimal, frozen: Decimal },

    /// Ledger amounts must not be negative.
    #[error("TC_ERR_202: Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// A product or balance update would overflow or lose digits.
    #[error("TC_ERR_203: Amount not exactly representable: {reason}")]
    AmountOverflow { reason: String },

    // =================================================================
    // Sequencing Errors (3xx)
    // =================================================================
    /// The batch handed to the sequencer is not acceptable.
    #[error("TC_ERR_300: Invalid batch: {reason}")]
    InvalidBatch { reason: String },

    // =================================================================
    // Engine Errors (4xx)
    // =================================================================
    /// The engine has latched a fatal error and refuses further work.
    #[error("TC_ERR_400: Engine halted: {reason}")]
    EngineHalted { reason: String },

    /// An event's previous id does not link to the last applied event.
    #[error(
        "TC_ERR_401: Broken event chain at sequence {sequence_id}: expected previous {expected}, got {actual}"
    )]
    ChainBroken {
        sequence_id: SequenceId,
        expected: SequenceId,
        actual: SequenceId,
    },

    /// A gap was detected and the store could not supply the missing events.
    #[error("TC_ERR_402: Lost events after sequence {last_sequence_id} cannot be recovered")]
    LostEvents { last_sequence_id: SequenceId },

    // =================================================================
    // Validation Errors (5xx)
    // =================================================================
    /// A cross-component invariant does not hold.
    #[error("TC_ERR_500: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // =================================================================
    // Store Errors (6xx)
    // =================================================================
    /// The store refused a batch (duplicate key, non-monotonic sequence id).
    #[error("TC_ERR_600: Store conflict: {reason}")]
    StoreConflict { reason: String },

    /// The persisted log cannot be read back.
    #[error("TC_ERR_601: Store corrupted: {reason}")]
    StoreCorrupted { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("TC_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk).
    #[error("TC_ERR_903: I/O error: {0}")]
    Io(String),
}

impl TradecoreError {
    /// Whether this error must halt the trading engine.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EngineHalted { .. }
                | Self::ChainBroken { .. }
                | Self::LostEvents { .. }
                | Self::InvariantViolation { .. }
                | Self::StoreCorrupted { .. }
                | Self::Internal(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TradecoreError>;

// Conversion from std::io::Error
impl From<std::io::Error> for TradecoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TradecoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
