//! What one processed batch hands to downstream collaborators.

use serde::Serialize;
use tradecore_types::{Notification, OrderBookSnapshot, Tick};

/// Output of [`TradingEngine::process_events`](crate::TradingEngine::process_events).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutput {
    /// Present only if the book changed during the batch.
    pub order_book: Option<OrderBookSnapshot>,
    /// One per fill, in execution order.
    pub ticks: Vec<Tick>,
    /// Per-user order-closed notifications, then the order-book broadcast.
    pub notifications: Vec<Notification>,
}

impl BatchOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_book.is_none() && self.ticks.is_empty() && self.notifications.is_empty()
    }
}
