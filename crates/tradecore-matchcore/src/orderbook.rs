//! One side of the order book.
//!
//! Uses a `BTreeMap<Decimal, PriceLevel>` for price-level ordering; the best
//! level is the highest key for the buy side and the lowest for the sell
//! side. Within a level, time priority is FIFO.
//!
//! An auxiliary `HashMap<OrderId, Decimal>` enables O(log N) removal.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tradecore_types::{
    Direction, Order, OrderArena, OrderBookLevel, OrderId, Result, TradecoreError,
};

use crate::price_level::PriceLevel;

/// The resting orders of one direction.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Which side this book holds.
    pub direction: Direction,
    levels: BTreeMap<Decimal, PriceLevel>,
    /// Fast lookup: `OrderId -> price` for removal.
    index: HashMap<OrderId, Decimal>,
}

impl OrderBook {
    /// Create a new empty book for the given direction.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            levels: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Add an order at the back of its price level.
    pub fn add(&mut self, order: &Order) -> Result<()> {
        if order.direction != self.direction {
            return Err(TradecoreError::InvalidOrder {
                reason: format!(
                    "order {} is {} but book is {}",
                    order.id, order.direction, self.direction
                ),
            });
        }
        if self.index.contains_key(&order.id) {
            return Err(TradecoreError::DuplicateOrder(order.id));
        }

        self.index.insert(order.id, order.price);
        self.levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price))
            .push_back(order.id);
        Ok(())
    }

    /// Remove an order by id. Empty levels are dropped.
    pub fn remove(&mut self, id: OrderId) -> Result<()> {
        let price = self
            .index
            .remove(&id)
            .ok_or(TradecoreError::OrderNotFound(id))?;
        let level = self
            .levels
            .get_mut(&price)
            .ok_or(TradecoreError::OrderNotFound(id))?;
        if !level.remove(id) {
            return Err(TradecoreError::OrderNotFound(id));
        }
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    fn best_level(&self) -> Option<&PriceLevel> {
        match self.direction {
            Direction::Buy => self.levels.values().next_back(),
            Direction::Sell => self.levels.values().next(),
        }
    }

    /// The order with the highest priority: best price, then earliest.
    #[must_use]
    pub fn first(&self) -> Option<OrderId> {
        self.best_level().and_then(PriceLevel::front)
    }

    /// Best price (highest bid / lowest ask), or `None` if empty.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        self.best_level().map(|l| l.price)
    }

    /// Check if an order rests in this book.
    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Price level an order rests at.
    #[must_use]
    pub fn price_of(&self, id: OrderId) -> Option<Decimal> {
        self.index.get(&id).copied()
    }

    /// Total number of orders in this book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct price levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Iterate levels from best to worst.
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.direction {
            Direction::Buy => Box::new(self.levels.values().rev()),
            Direction::Sell => Box::new(self.levels.values()),
        }
    }

    /// Iterate order ids in priority order.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.levels().flat_map(|l| l.orders.iter().copied())
    }

    /// Aggregate unfilled quantity per level, best first, at most
    /// `max_depth` levels.
    #[must_use]
    pub fn snapshot(&self, max_depth: usize, arena: &OrderArena) -> Vec<OrderBookLevel> {
        self.levels()
            .take(max_depth)
            .map(|l| OrderBookLevel {
                price: l.price,
                quantity: l.total_quantity(arena),
            })
            .collect()
    }
}

impl std::fmt::Display for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "  {} (empty)", self.direction);
        }
        for level in self.levels() {
            writeln!(f, "  {} {:>12} x{}", self.direction, level.price, level.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tradecore_types::*;

    use super::*;

    fn order(seq: u64, direction: Direction, price: i64, qty: i64) -> Order {
        Order::dummy_limit(seq, UserId(10), direction, Decimal::new(price, 0), Decimal::new(qty, 0))
    }

    fn book_with(direction: Direction, orders: &[Order]) -> (OrderBook, OrderArena) {
        let mut book = OrderBook::new(direction);
        let mut arena = OrderArena::new();
        for o in orders {
            book.add(o).unwrap();
            arena.insert(o.clone());
        }
        (book, arena)
    }

    #[test]
    fn buy_book_best_is_highest() {
        let (book, _) = book_with(
            Direction::Buy,
            &[
                order(1, Direction::Buy, 90, 1),
                order(2, Direction::Buy, 100, 1),
                order(3, Direction::Buy, 95, 1),
            ],
        );
        assert_eq!(book.best_price(), Some(Decimal::new(100, 0)));
        assert_eq!(book.first(), Some(OrderId(2)));
        let prices: Vec<Decimal> = book.levels().map(|l| l.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::new(100, 0), Decimal::new(95, 0), Decimal::new(90, 0)]
        );
    }

    #[test]
    fn sell_book_best_is_lowest() {
        let (book, _) = book_with(
            Direction::Sell,
            &[
                order(1, Direction::Sell, 110, 1),
                order(2, Direction::Sell, 101, 1),
                order(3, Direction::Sell, 105, 1),
            ],
        );
        assert_eq!(book.best_price(), Some(Decimal::new(101, 0)));
        assert_eq!(book.first(), Some(OrderId(2)));
    }

    #[test]
    fn time_priority_within_level() {
        let (book, _) = book_with(
            Direction::Sell,
            &[order(1, Direction::Sell, 100, 1), order(2, Direction::Sell, 100, 1)],
        );
        assert_eq!(book.first(), Some(OrderId(1)));
        assert_eq!(book.order_ids().collect::<Vec<_>>(), vec![OrderId(1), OrderId(2)]);
    }

    #[test]
    fn equal_prices_with_different_scale_share_a_level() {
        let mut a = order(1, Direction::Buy, 100, 1);
        a.price = Decimal::new(10000, 2); // 100.00
        let b = order(2, Direction::Buy, 100, 1);
        let (book, _) = book_with(Direction::Buy, &[a, b]);
        assert_eq!(book.depth(), 1);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn remove_drops_empty_level() {
        let (mut book, _) = book_with(Direction::Buy, &[order(1, Direction::Buy, 100, 1)]);
        assert_eq!(book.depth(), 1);
        book.remove(OrderId(1)).unwrap();
        assert_eq!(book.depth(), 0);
        assert!(book.is_empty());
        assert!(book.first().is_none());
    }

    #[test]
    fn remove_unknown_fails() {
        let mut book = OrderBook::new(Direction::Buy);
        let err = book.remove(OrderId(7)).unwrap_err();
        assert!(matches!(err, TradecoreError::OrderNotFound(OrderId(7))));
    }

    #[test]
    fn duplicate_and_wrong_direction_rejected() {
        let o = order(1, Direction::Buy, 100, 1);
        let (mut book, _) = book_with(Direction::Buy, &[o.clone()]);
        assert!(matches!(book.add(&o), Err(TradecoreError::DuplicateOrder(_))));
        let sell = order(2, Direction::Sell, 100, 1);
        assert!(matches!(book.add(&sell), Err(TradecoreError::InvalidOrder { .. })));
    }

    #[test]
    fn snapshot_aggregates_and_truncates() {
        let (book, arena) = book_with(
            Direction::Sell,
            &[
                order(1, Direction::Sell, 101, 2),
                order(2, Direction::Sell, 101, 3),
                order(3, Direction::Sell, 102, 1),
                order(4, Direction::Sell, 103, 1),
            ],
        );
        let levels = book.snapshot(2, &arena);
        assert_eq!(
            levels,
            vec![
                OrderBookLevel { price: Decimal::new(101, 0), quantity: Decimal::new(5, 0) },
                OrderBookLevel { price: Decimal::new(102, 0), quantity: Decimal::ONE },
            ]
        );
    }
}
