//! Continuous price/time-priority matching.
//!
//! The match engine owns both books and the last traded price. It never
//! touches balances: the taker is matched against resting orders, the
//! arena is updated in place, and the resulting [`MatchResult`] is handed to
//! clearing by the caller.
//!
//! ```text
//! process_order(seq, taker) -> MatchResult
//! ```
//!
//! Given the same book state and the same taker, the output is always
//! identical. No clock, no I/O.

use rust_decimal::Decimal;
use tracing::trace;
use tradecore_types::{
    Direction, MatchResult, Order, OrderArena, OrderBookSnapshot, OrderId, OrderStatus, Result,
    SequenceId, TradecoreError,
};

use crate::OrderBook;

/// Two-sided book plus market price.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    pub buy_book: OrderBook,
    pub sell_book: OrderBook,
    /// Price of the most recent fill (the maker's price).
    pub market_price: Decimal,
    /// Sequence id of the last processed order.
    pub sequence_id: SequenceId,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buy_book: OrderBook::new(Direction::Buy),
            sell_book: OrderBook::new(Direction::Sell),
            market_price: Decimal::ZERO,
            sequence_id: 0,
        }
    }

    /// The book holding orders of `direction`.
    #[must_use]
    pub fn book(&self, direction: Direction) -> &OrderBook {
        match direction {
            Direction::Buy => &self.buy_book,
            Direction::Sell => &self.sell_book,
        }
    }

    // =================================================================
    // Matching
    // =================================================================

    /// Match the taker (already present in `arena`) against the opposite
    /// book. Any unfilled remainder rests on the taker's own book.
    ///
    /// Fills execute at the maker's price. Maker and taker statuses and
    /// unfilled quantities are written back into the arena; the returned
    /// result carries snapshots taken after each fill.
    pub fn process_order(
        &mut self,
        sequence_id: SequenceId,
        taker_id: OrderId,
        arena: &mut OrderArena,
    ) -> Result<MatchResult> {
        self.sequence_id = sequence_id;

        let taker = arena
            .get(taker_id)
            .cloned()
            .ok_or(TradecoreError::OrderNotFound(taker_id))?;
        if taker.unfilled_quantity <= Decimal::ZERO {
            return Err(TradecoreError::InvalidOrder {
                reason: format!("taker {taker_id} has nothing to fill"),
            });
        }
        let ts = taker.created_at;

        let (maker_book, taker_book) = match taker.direction {
            Direction::Buy => (&mut self.sell_book, &mut self.buy_book),
            Direction::Sell => (&mut self.buy_book, &mut self.sell_book),
        };

        let mut taker_unfilled = taker.unfilled_quantity;
        let mut fills: Vec<(Decimal, Decimal, Order)> = Vec::new();

        while let Some(maker_id) = maker_book.first() {
            let maker = arena.get_mut(maker_id).ok_or_else(|| {
                TradecoreError::InvariantViolation {
                    reason: format!("order {maker_id} rests in the book but not in the arena"),
                }
            })?;

            let crosses = match taker.direction {
                Direction::Buy => taker.price >= maker.price,
                Direction::Sell => taker.price <= maker.price,
            };
            if !crosses {
                break;
            }

            self.market_price = maker.price;
            let matched = taker_unfilled.min(maker.unfilled_quantity);
            taker_unfilled -= matched;

            let maker_unfilled = maker.unfilled_quantity - matched;
            if maker_unfilled.is_zero() {
                maker.update(maker_unfilled, OrderStatus::FullyFilled, ts);
            } else {
                maker.update(maker_unfilled, OrderStatus::PartialFilled, ts);
            }
            trace!(
                taker = %taker_id,
                maker = %maker_id,
                price = %maker.price,
                quantity = %matched,
                "fill"
            );
            fills.push((maker.price, matched, maker.clone()));

            if maker_unfilled.is_zero() {
                maker_book.remove(maker_id)?;
            }
            if taker_unfilled.is_zero() {
                break;
            }
        }

        let taker_status = if taker_unfilled.is_zero() {
            OrderStatus::FullyFilled
        } else if fills.is_empty() {
            OrderStatus::Pending
        } else {
            OrderStatus::PartialFilled
        };
        let taker = arena
            .get_mut(taker_id)
            .ok_or(TradecoreError::OrderNotFound(taker_id))?;
        taker.update(taker_unfilled, taker_status, ts);
        if !taker_unfilled.is_zero() {
            taker_book.add(taker)?;
        }

        let mut result = MatchResult::new(taker.clone());
        for (price, quantity, maker) in fills {
            result.add(price, quantity, maker);
        }
        Ok(result)
    }

    /// Remove a resting order and mark it cancelled.
    ///
    /// Status becomes `Cancelled` if nothing was filled, otherwise
    /// `PartialCancelled`. An order that is active but not in its book is
    /// an index drift and returns `OrderNotFound`.
    pub fn cancel(&mut self, ts: i64, order_id: OrderId, arena: &mut OrderArena) -> Result<Order> {
        let order = arena
            .get_mut(order_id)
            .ok_or(TradecoreError::OrderNotFound(order_id))?;
        let book = match order.direction {
            Direction::Buy => &mut self.buy_book,
            Direction::Sell => &mut self.sell_book,
        };
        book.remove(order_id)?;

        let status = if order.unfilled_quantity == order.quantity {
            OrderStatus::Cancelled
        } else {
            OrderStatus::PartialCancelled
        };
        order.update(order.unfilled_quantity, status, ts);
        Ok(order.clone())
    }

    // =================================================================
    // Snapshot
    // =================================================================

    /// Depth-limited view of both books. Does not mutate state.
    #[must_use]
    pub fn order_book(&self, max_depth: usize, arena: &OrderArena) -> OrderBookSnapshot {
        OrderBookSnapshot {
            sequence_id: self.sequence_id,
            price: self.market_price,
            buy: self.buy_book.snapshot(max_depth, arena),
            sell: self.sell_book.snapshot(max_depth, arena),
        }
    }
}

impl std::fmt::Display for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.sell_book)?;
        writeln!(f, "  ---------- {} ----------", self.market_price)?;
        write!(f, "{}", self.buy_book)
    }
}
