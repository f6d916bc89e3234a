//! Order types for the tradecore exchange core.
//!
//! Orders live in an [`OrderArena`] addressed by [`OrderId`]. The order books
//! and the active-order index both refer to orders by id; all mutation goes
//! through the arena.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetKind, OrderId, Result, SequenceId, UserId, exact_mul};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// The asset an order in this direction freezes.
    #[must_use]
    pub fn frozen_asset(self) -> AssetKind {
        match self {
            Self::Buy => AssetKind::QUOTE,
            Self::Sell => AssetKind::BASE,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Resting, nothing filled yet.
    Pending,
    /// Partially filled and still resting.
    PartialFilled,
    FullyFilled,
    /// Cancelled before any fill.
    Cancelled,
    /// Cancelled after a partial fill.
    PartialCancelled,
}

impl OrderStatus {
    /// Final orders must leave the book and the active-order index.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Self::FullyFilled | Self::Cancelled | Self::PartialCancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::PartialFilled => write!(f, "PARTIAL_FILLED"),
            Self::FullyFilled => write!(f, "FULLY_FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::PartialCancelled => write!(f, "PARTIAL_CANCELLED"),
        }
    }
}

/// A limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Sequence id of the event that created this order.
    pub sequence_id: SequenceId,
    pub user_id: UserId,
    pub direction: Direction,
    pub price: Decimal,
    /// Original quantity.
    pub quantity: Decimal,
    /// Monotonically non-increasing.
    pub unfilled_quantity: Decimal,
    pub status: OrderStatus,
    /// Milliseconds since UNIX epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// A freshly admitted order: nothing filled, status `Pending`.
    #[must_use]
    pub fn new(
        id: OrderId,
        sequence_id: SequenceId,
        user_id: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            sequence_id,
            user_id,
            direction,
            price,
            quantity,
            unfilled_quantity: quantity,
            status: OrderStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    /// Apply a fill or cancellation result.
    pub fn update(&mut self, unfilled_quantity: Decimal, status: OrderStatus, updated_at: i64) {
        self.unfilled_quantity = unfilled_quantity;
        self.status = status;
        self.updated_at = updated_at;
    }

    #[must_use]
    pub fn filled_quantity(&self) -> Decimal {
        self.quantity - self.unfilled_quantity
    }

    /// The ledger amount this order currently holds frozen:
    /// `price × unfilled` quote for buys, `unfilled` base for sells.
    pub fn frozen_amount(&self) -> Result<Decimal> {
        match self.direction {
            Direction::Buy => exact_mul(self.price, self.unfilled_quantity),
            Direction::Sell => Ok(self.unfilled_quantity),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order[{}] {} {} {}/{} @ {} {}",
            self.id,
            self.user_id,
            self.direction,
            self.unfilled_quantity,
            self.quantity,
            self.price,
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// OrderArena
// ---------------------------------------------------------------------------

/// Owner of every live order, keyed by id.
///
/// `BTreeMap` keeps iteration in id order, which keeps diagnostics and
/// state digests stable across runs.
#[derive(Debug, Clone, Default)]
pub struct OrderArena {
    orders: BTreeMap<OrderId, Order>,
}

impl OrderArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order. Returns the previous order with the same id, if any.
    pub fn insert(&mut self, order: Order) -> Option<Order> {
        self.orders.insert(order.id, order)
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id)
    }

    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        self.orders.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Iterate orders in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(
        sequence_id: SequenceId,
        user_id: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self::new(
            OrderId(sequence_id),
            sequence_id,
            user_id,
            direction,
            price,
            quantity,
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display_and_negate() {
        assert_eq!(format!("{}", Direction::Buy), "BUY");
        assert_eq!(Direction::Buy.negate(), Direction::Sell);
        assert_eq!(Direction::Sell.negate(), Direction::Buy);
    }

    #[test]
    fn frozen_asset_by_direction() {
        assert_eq!(Direction::Buy.frozen_asset(), AssetKind::Usd);
        assert_eq!(Direction::Sell.frozen_asset(), AssetKind::Btc);
    }

    #[test]
    fn final_statuses() {
        assert!(!OrderStatus::Pending.is_final());
        assert!(!OrderStatus::PartialFilled.is_final());
        assert!(OrderStatus::FullyFilled.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(OrderStatus::PartialCancelled.is_final());
    }

    #[test]
    fn frozen_amount() {
        let mut buy = Order::dummy_limit(1, UserId(10), Direction::Buy, Decimal::new(100, 0), Decimal::new(3, 0));
        assert_eq!(buy.frozen_amount().unwrap(), Decimal::new(300, 0));
        buy.update(Decimal::ONE, OrderStatus::PartialFilled, 5);
        assert_eq!(buy.frozen_amount().unwrap(), Decimal::new(100, 0));
        assert_eq!(buy.filled_quantity(), Decimal::TWO);
        assert_eq!(buy.updated_at, 5);

        let sell = Order::dummy_limit(2, UserId(10), Direction::Sell, Decimal::new(100, 0), Decimal::new(3, 0));
        assert_eq!(sell.frozen_amount().unwrap(), Decimal::new(3, 0));
    }

    #[test]
    fn arena_insert_get_remove() {
        let mut arena = OrderArena::new();
        let order = Order::dummy_limit(1, UserId(10), Direction::Buy, Decimal::ONE, Decimal::ONE);
        assert!(arena.insert(order.clone()).is_none());
        assert!(arena.contains(order.id));
        assert_eq!(arena.get(order.id), Some(&order));
        arena.get_mut(order.id).unwrap().status = OrderStatus::PartialFilled;
        assert_eq!(arena.get(order.id).unwrap().status, OrderStatus::PartialFilled);
        assert!(arena.remove(order.id).is_some());
        assert!(arena.is_empty());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::PartialFilled).unwrap();
        assert_eq!(json, "\"PARTIAL_FILLED\"");
    }
}
