//! Cross-component invariant checks.
//!
//! ```text
//! ∀ asset: Σ_users (available + frozen) == 0
//! ∀ user ≠ debt: available ≥ 0 ∧ frozen ≥ 0
//! debt: available ≤ 0 ∧ frozen == 0
//! ∀ (user, asset): frozen == Σ frozen_amount(active orders)
//! books ≡ active orders (same ids, same side, same price)
//! ```
//!
//! Any violation is an `InvariantViolation`, which halts the engine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tradecore_ledger::{AssetService, OrderService};
use tradecore_matchcore::MatchEngine;
use tradecore_types::{AssetKind, Direction, Result, TradecoreError, UserId, exact_add};

fn violation(reason: String) -> TradecoreError {
    TradecoreError::InvariantViolation { reason }
}

/// Run every check.
pub fn validate(assets: &AssetService, orders: &OrderService, engine: &MatchEngine) -> Result<()> {
    validate_assets(assets)?;
    validate_orders(assets, orders)?;
    validate_match_engine(orders, engine)?;
    Ok(())
}

/// Zero-sum and sign checks.
pub fn validate_assets(assets: &AssetService) -> Result<()> {
    for kind in AssetKind::ALL {
        let total = assets.total(kind);
        if !total.is_zero() {
            return Err(violation(format!("{kind} does not sum to zero: {total}")));
        }
    }
    for (user, kind, asset) in assets.iter() {
        if user.is_debt() {
            if asset.available > Decimal::ZERO || !asset.frozen.is_zero() {
                return Err(violation(format!("debt account {kind} is {asset}")));
            }
        } else if asset.available < Decimal::ZERO || asset.frozen < Decimal::ZERO {
            return Err(violation(format!("{user} {kind} is negative: {asset}")));
        }
    }
    Ok(())
}

/// Every frozen balance is explained by active orders, and nothing more.
pub fn validate_orders(assets: &AssetService, orders: &OrderService) -> Result<()> {
    let mut expected: BTreeMap<(UserId, AssetKind), Decimal> = BTreeMap::new();
    for order in orders.arena().iter() {
        if order.status.is_final() {
            return Err(violation(format!("final order still active: {order}")));
        }
        if order.unfilled_quantity <= Decimal::ZERO {
            return Err(violation(format!("active order has nothing unfilled: {order}")));
        }
        let frozen = order.frozen_amount().map_err(|e| violation(format!("{order}: {e}")))?;
        let slot = expected
            .entry((order.user_id, order.direction.frozen_asset()))
            .or_default();
        *slot = exact_add(*slot, frozen).map_err(|e| violation(e.to_string()))?;
    }

    let actual: BTreeMap<(UserId, AssetKind), Decimal> = assets
        .iter()
        .filter(|(_, _, asset)| !asset.frozen.is_zero())
        .map(|(user, kind, asset)| ((user, kind), asset.frozen))
        .collect();

    for (key, amount) in &expected {
        let frozen = actual.get(key).copied().unwrap_or_default();
        if frozen != *amount {
            return Err(violation(format!(
                "{} {} frozen {frozen} but active orders hold {amount}",
                key.0, key.1
            )));
        }
    }
    for (key, frozen) in &actual {
        if !expected.contains_key(key) {
            return Err(violation(format!(
                "{} {} frozen {frozen} with no active orders",
                key.0, key.1
            )));
        }
    }
    Ok(())
}

/// Book membership matches the active order index exactly.
pub fn validate_match_engine(orders: &OrderService, engine: &MatchEngine) -> Result<()> {
    let mut in_books = 0usize;
    for direction in [Direction::Buy, Direction::Sell] {
        let book = engine.book(direction);
        for id in book.order_ids() {
            in_books += 1;
            let order = orders
                .get(id)
                .ok_or_else(|| violation(format!("order {id} in {direction} book is not active")))?;
            if order.direction != direction {
                return Err(violation(format!("{order} rests in the {direction} book")));
            }
            if book.price_of(id) != Some(order.price) {
                return Err(violation(format!("{order} rests at the wrong price level")));
            }
        }
    }
    for order in orders.arena().iter() {
        if !engine.book(order.direction).contains(order.id)
            || engine.book(order.direction.negate()).contains(order.id)
        {
            return Err(violation(format!("active {order} is not in exactly its own book")));
        }
    }
    if in_books != orders.len() {
        return Err(violation(format!(
            "books hold {in_books} orders but {} are active",
            orders.len()
        )));
    }
    Ok(())
}
