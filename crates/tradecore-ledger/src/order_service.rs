//! Order admission and the active-order index.
//!
//! An order is admitted only after its funds are frozen: `price × quantity`
//! quote for a buy, `quantity` base for a sell. Admitted orders live in the
//! [`OrderArena`] until they reach a final status and clearing removes them.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::warn;
use tradecore_types::constants::{MAX_ORDER_NOTIONAL, PRICE_PRECISION, QTY_PRECISION};
use tradecore_types::{
    AssetKind, Direction, Order, OrderArena, OrderId, Result, SequenceId, TradecoreError, UserId,
    exact_mul,
};

use crate::AssetService;

/// Price and quantity limits every admitted order satisfies. Inside them
/// every fill, refund and remaining freeze is exactly representable.
fn check_order_limits(price: Decimal, quantity: Decimal) -> Result<Decimal> {
    let invalid = |reason: String| TradecoreError::InvalidOrder { reason };
    if price <= Decimal::ZERO || quantity <= Decimal::ZERO {
        return Err(invalid(format!(
            "price {price} and quantity {quantity} must be positive"
        )));
    }
    if price.normalize().scale() > PRICE_PRECISION {
        return Err(invalid(format!(
            "price {price} has more than {PRICE_PRECISION} decimal places"
        )));
    }
    if quantity.normalize().scale() > QTY_PRECISION {
        return Err(invalid(format!(
            "quantity {quantity} has more than {QTY_PRECISION} decimal places"
        )));
    }
    let notional = exact_mul(price, quantity).map_err(|e| invalid(e.to_string()))?;
    if notional > Decimal::from(MAX_ORDER_NOTIONAL) {
        return Err(invalid(format!(
            "notional {notional} exceeds {MAX_ORDER_NOTIONAL}"
        )));
    }
    Ok(notional)
}

/// Owner of all active orders.
#[derive(Debug, Clone, Default)]
pub struct OrderService {
    orders: OrderArena,
    /// Active order ids per user.
    user_orders: BTreeMap<UserId, BTreeSet<OrderId>>,
}

impl OrderService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the funds an order needs and admit it.
    ///
    /// Returns `Ok(None)` if the user cannot cover the freeze; nothing is
    /// changed in that case.
    ///
    /// # Errors
    /// `InvalidOrder` for a non-positive price or quantity, too many
    /// decimal places, or a notional that is unrepresentable or above
    /// [`MAX_ORDER_NOTIONAL`]. `DuplicateOrder` if the id is already active.
    #[allow(clippy::too_many_arguments)]
    pub fn create_order(
        &mut self,
        assets: &mut AssetService,
        sequence_id: SequenceId,
        created_at: i64,
        order_id: OrderId,
        user_id: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Option<Order>> {
        let notional = check_order_limits(price, quantity)?;
        if self.orders.contains(order_id) {
            return Err(TradecoreError::DuplicateOrder(order_id));
        }

        let (asset, amount) = match direction {
            Direction::Buy => (AssetKind::QUOTE, notional),
            Direction::Sell => (AssetKind::BASE, quantity),
        };
        if let Err(err) = assets.freeze(user_id, asset, amount) {
            warn!(user = %user_id, %asset, %amount, error = %err, "freeze failed");
            return Ok(None);
        }

        let order = Order::new(
            order_id,
            sequence_id,
            user_id,
            direction,
            price,
            quantity,
            created_at,
        );
        self.orders.insert(order.clone());
        self.user_orders.entry(user_id).or_default().insert(order_id);
        Ok(Some(order))
    }

    /// Drop an order from the active index.
    pub fn remove_order(&mut self, order_id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .remove(order_id)
            .ok_or(TradecoreError::OrderNotFound(order_id))?;
        if let Some(ids) = self.user_orders.get_mut(&order.user_id) {
            ids.remove(&order_id);
            if ids.is_empty() {
                self.user_orders.remove(&order.user_id);
            }
        }
        Ok(order)
    }

    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Active order ids of a user, ascending.
    pub fn user_orders(&self, user_id: UserId) -> impl Iterator<Item = OrderId> + '_ {
        self.user_orders
            .get(&user_id)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    #[must_use]
    pub fn arena(&self) -> &OrderArena {
        &self.orders
    }

    /// Mutable arena access for the match engine.
    pub fn arena_mut(&mut self) -> &mut OrderArena {
        &mut self.orders
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
