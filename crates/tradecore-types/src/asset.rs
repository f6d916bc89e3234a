//! Balance tracking types for the tradecore ledger.
//!
//! Every (user, asset kind) pair has an `available` balance (usable for new
//! orders and withdrawals) and a `frozen` balance (reserved by open orders).

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The asset kinds traded on the exchange.
///
/// The single instrument is `BTC/USD`: BTC is the base asset (frozen by
/// sell orders), USD the quote asset (frozen by buy orders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetKind {
    Usd,
    Btc,
}

impl AssetKind {
    /// Every asset kind, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Usd, Self::Btc];

    /// Asset frozen by sell orders and delivered to buyers.
    pub const BASE: Self = Self::Btc;

    /// Asset frozen by buy orders and delivered to sellers.
    pub const QUOTE: Self = Self::Usd;
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Btc => write!(f, "BTC"),
        }
    }
}

/// A single balance entry for a (user, asset) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    /// Available for new orders / withdrawal.
    pub available: Decimal,
    /// Frozen for active orders.
    pub frozen: Decimal,
}

impl Asset {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: Decimal::ZERO,
            frozen: Decimal::ZERO,
        }
    }

    /// Total balance (available + frozen).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.frozen
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.frozen.is_zero()
    }
}

impl Default for Asset {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[available={}, frozen={}]", self.available, self.frozen)
    }
}
