//! A single price level in the order book.
//!
//! Orders at the same price are stored in FIFO order (time priority)
//! using a [`VecDeque`] of ids.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use tradecore_types::{OrderArena, OrderId};

/// A single price level containing the ids of all orders at that price.
///
/// The front of the deque has the highest time priority and will be
/// filled first.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    /// Order ids in time-priority order (front = oldest = highest priority).
    pub orders: VecDeque<OrderId>,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Add an order to the back of this level (lowest time priority).
    pub fn push_back(&mut self, id: OrderId) {
        self.orders.push_back(id);
    }

    /// Peek at the front order without removing it.
    #[must_use]
    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    /// Total unfilled quantity across all orders at this level.
    ///
    /// Ids missing from the arena contribute nothing; membership drift is
    /// reported by the engine's validation pass, not here.
    #[must_use]
    pub fn total_quantity(&self, arena: &OrderArena) -> Decimal {
        self.orders
            .iter()
            .filter_map(|id| arena.get(*id))
            .map(|o| o.unfilled_quantity)
            .sum()
    }

    /// Remove a specific order by id. Returns `true` if it was present.
    pub fn remove(&mut self, id: OrderId) -> bool {
        match self.orders.iter().position(|o| *o == id) {
            Some(pos) => {
                self.orders.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
