//! Clearing: settles match results and cancellations in the ledger.
//!
//! Per fill between a taker and a maker at the maker's price `p` for
//! quantity `q`:
//!
//! ```text
//! BUY taker:   refund (taker.price - p) × q quote to taker (price improvement)
//!              taker.frozen quote  p × q  → maker.available
//!              maker.frozen base   q      → taker.available
//! SELL taker:  taker.frozen base   q      → maker.available
//!              maker.frozen quote  p × q  → taker.available
//! ```
//!
//! Orders that reached a final status are removed from the active index.
//! A failure here means frozen funds and orders disagree; callers treat it
//! as fatal.

use tradecore_types::{AssetKind, Direction, MatchResult, Order, Result, exact_mul, exact_sub};

use crate::{AssetService, OrderService, TransferKind};

/// Settle every fill of `result`. Returns the orders that were closed,
/// taker first.
pub fn clear_match_result(
    assets: &mut AssetService,
    orders: &mut OrderService,
    result: &MatchResult,
) -> Result<Vec<Order>> {
    let taker = &result.taker;
    for detail in &result.details {
        let maker = &detail.maker;
        let matched = detail.quantity;
        match taker.direction {
            Direction::Buy => {
                if taker.price > maker.price {
                    let refund = exact_mul(exact_sub(taker.price, maker.price)?, matched)?;
                    assets.unfreeze(taker.user_id, AssetKind::QUOTE, refund)?;
                }
                assets.transfer(
                    TransferKind::FrozenToAvailable,
                    taker.user_id,
                    maker.user_id,
                    AssetKind::QUOTE,
                    exact_mul(maker.price, matched)?,
                )?;
                assets.transfer(
                    TransferKind::FrozenToAvailable,
                    maker.user_id,
                    taker.user_id,
                    AssetKind::BASE,
                    matched,
                )?;
            }
            Direction::Sell => {
                assets.transfer(
                    TransferKind::FrozenToAvailable,
                    taker.user_id,
                    maker.user_id,
                    AssetKind::BASE,
                    matched,
                )?;
                assets.transfer(
                    TransferKind::FrozenToAvailable,
                    maker.user_id,
                    taker.user_id,
                    AssetKind::QUOTE,
                    exact_mul(maker.price, matched)?,
                )?;
            }
        }
        if maker.unfilled_quantity.is_zero() {
            orders.remove_order(maker.id)?;
        }
    }
    if taker.unfilled_quantity.is_zero() {
        orders.remove_order(taker.id)?;
    }
    Ok(result.closed_orders())
}

/// Release what a cancelled order still holds frozen and drop it from
/// the active index.
pub fn clear_cancel_order(
    assets: &mut AssetService,
    orders: &mut OrderService,
    order: &Order,
) -> Result<()> {
    assets.unfreeze(order.user_id, order.direction.frozen_asset(), order.frozen_amount()?)?;
    orders.remove_order(order.id)?;
    Ok(())
}
