//! State digest for replay verification.
//!
//! Two engines that applied the same ordered events must hold identical
//! state. The digest is a SHA-256 over everything that defines that state,
//! visited in a fixed order, so comparing digests replaces comparing full
//! dumps.

use sha2::{Digest, Sha256};
use tradecore_ledger::{AssetService, OrderService};
use tradecore_matchcore::MatchEngine;
use tradecore_types::{Direction, SequenceId};

/// Hex-encoded SHA-256 of the engine state.
///
/// Covers the last sequence id, market price, every balance entry in
/// (user, asset) order, every active order in id order, and both books in
/// priority order.
#[must_use]
pub fn state_digest(
    last_sequence_id: SequenceId,
    assets: &AssetService,
    orders: &OrderService,
    engine: &MatchEngine,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"tradecore:state:v1:");
    hasher.update(last_sequence_id.to_le_bytes());
    hasher.update(engine.market_price.normalize().to_string().as_bytes());

    hasher.update(b"assets");
    for (user, kind, asset) in assets.iter() {
        hasher.update(user.0.to_le_bytes());
        hasher.update(kind.to_string().as_bytes());
        hasher.update(asset.available.normalize().to_string().as_bytes());
        hasher.update(b"/");
        hasher.update(asset.frozen.normalize().to_string().as_bytes());
    }

    hasher.update(b"orders");
    for order in orders.arena().iter() {
        hasher.update(order.id.0.to_le_bytes());
        hasher.update(order.user_id.0.to_le_bytes());
        hasher.update(order.direction.to_string().as_bytes());
        hasher.update(order.price.normalize().to_string().as_bytes());
        hasher.update(b"/");
        hasher.update(order.unfilled_quantity.normalize().to_string().as_bytes());
        hasher.update(order.status.to_string().as_bytes());
        hasher.update(order.updated_at.to_le_bytes());
    }

    for direction in [Direction::Buy, Direction::Sell] {
        hasher.update(direction.to_string().as_bytes());
        for id in engine.book(direction).order_ids() {
            hasher.update(id.0.to_le_bytes());
        }
    }

    hex::encode(hasher.finalize())
}
