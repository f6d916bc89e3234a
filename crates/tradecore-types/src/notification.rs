//! Payloads handed to the push gateway and tick consumers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Direction, Order, OrderBookSnapshot, OrderId, SequenceId, UserId};

/// One executed fill, for market-data consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub sequence_id: SequenceId,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub taker_direction: Direction,
    pub price: Decimal,
    pub quantity: Decimal,
    pub created_at: i64,
}

/// What a notification carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// An order left the book fully filled.
    OrderMatched(Order),
    /// An order left the book through cancellation.
    OrderCanceled(Order),
    OrderBook(OrderBookSnapshot),
}

/// A push payload. `user_id: None` means broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: Option<UserId>,
    pub created_at: i64,
    pub kind: NotificationKind,
}

impl Notification {
    /// Per-user notification for an order that reached a final status.
    #[must_use]
    pub fn order_closed(order: Order, created_at: i64) -> Self {
        let user_id = Some(order.user_id);
        let kind = if order.status == crate::OrderStatus::FullyFilled {
            NotificationKind::OrderMatched(order)
        } else {
            NotificationKind::OrderCanceled(order)
        };
        Self {
            user_id,
            created_at,
            kind,
        }
    }

    /// Broadcast of the latest order book.
    #[must_use]
    pub fn order_book(snapshot: OrderBookSnapshot, created_at: i64) -> Self {
        Self {
            user_id: None,
            created_at,
            kind: NotificationKind::OrderBook(snapshot),
        }
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.user_id.is_none()
    }
}
