//! Output of matching one taker order against the book.
//!
//! A [`MatchResult`] is produced once per admitted order and consumed exactly
//! once by clearing. Order snapshots are taken after the fill was applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Order;

/// One fill between the taker and a resting maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    /// Execution price (always the maker's resting price).
    pub price: Decimal,
    /// Executed quantity in base asset.
    pub quantity: Decimal,
    /// The maker order as it stood right after this fill.
    pub maker: Order,
}

/// Result of processing one taker order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The taker order after matching finished.
    pub taker: Order,
    /// Fills in execution order.
    pub details: Vec<MatchDetail>,
}

impl MatchResult {
    #[must_use]
    pub fn new(taker: Order) -> Self {
        Self {
            taker,
            details: Vec::new(),
        }
    }

    pub fn add(&mut self, price: Decimal, quantity: Decimal, maker: Order) {
        self.details.push(MatchDetail {
            price,
            quantity,
            maker,
        });
    }

    /// Total executed base quantity.
    #[must_use]
    pub fn matched_quantity(&self) -> Decimal {
        self.details.iter().map(|d| d.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Orders from this result that reached a final status: the taker first
    /// (if final), then each final maker in fill order.
    #[must_use]
    pub fn closed_orders(&self) -> Vec<Order> {
        std::iter::once(&self.taker)
            .chain(self.details.iter().map(|d| &d.maker))
            .filter(|o| o.status.is_final())
            .cloned()
            .collect()
    }
}
