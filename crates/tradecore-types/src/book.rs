//! Aggregated order-book snapshot published after each batch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::SequenceId;

/// Resting quantity aggregated at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Depth-limited view of both sides of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Last sequence id processed by the match engine.
    pub sequence_id: SequenceId,
    /// Last traded price.
    pub price: Decimal,
    /// Bids, best (highest) first.
    pub buy: Vec<OrderBookLevel>,
    /// Asks, best (lowest) first.
    pub sell: Vec<OrderBookLevel>,
}

impl OrderBookSnapshot {
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.buy.first().map(|l| l.price)
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.sell.first().map(|l| l.price)
    }
}
