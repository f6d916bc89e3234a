//! The asset ledger.
//!
//! Tracks per-(user, asset) balances with available/frozen accounting.
//! Every mutation is a transfer between two balance slots, so the sum of
//! all balances of an asset never changes. Fresh balance enters the system
//! through the debt account, whose `available` goes negative by the same
//! amount.
//!
//! A failed transfer leaves the ledger exactly as it was, including not
//! creating entries for users it has never seen.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tradecore_types::{Asset, AssetKind, Result, TradecoreError, UserId, exact_add, exact_sub};

/// Which balance slots a transfer moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// `from.available` → `to.available`.
    AvailableToAvailable,
    /// `from.available` → `to.frozen`. With `from == to` this is a freeze.
    AvailableToFrozen,
    /// `from.frozen` → `to.available`. With `from == to` this is an unfreeze.
    FrozenToAvailable,
}

/// Per-user, per-asset balance store.
///
/// `BTreeMap` keeps iteration in (user, asset) order for validation dumps
/// and state digests.
#[derive(Debug, Clone, Default)]
pub struct AssetService {
    assets: BTreeMap<UserId, BTreeMap<AssetKind, Asset>>,
}

impl AssetService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Transfers
    // =================================================================

    /// Move `amount` of `asset` between balance slots.
    ///
    /// Zero is a no-op. Negative amounts are rejected. With
    /// `check_balance`, the source slot must hold at least `amount`;
    /// without it the source may go negative (debt account only).
    ///
    /// # Errors
    /// `InvalidAmount`, `InsufficientBalance`, `InsufficientFrozen` or
    /// `AmountOverflow`; the ledger is unchanged on error.
    pub fn try_transfer(
        &mut self,
        kind: TransferKind,
        from: UserId,
        to: UserId,
        asset: AssetKind,
        amount: Decimal,
        check_balance: bool,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        if amount.is_sign_negative() {
            return Err(TradecoreError::InvalidAmount(amount));
        }

        if check_balance {
            let source = self.get(from, asset);
            match kind {
                TransferKind::AvailableToAvailable | TransferKind::AvailableToFrozen => {
                    if source.available < amount {
                        return Err(TradecoreError::InsufficientBalance {
                            needed: amount,
                            available: source.available,
                        });
                    }
                }
                TransferKind::FrozenToAvailable => {
                    if source.frozen < amount {
                        return Err(TradecoreError::InsufficientFrozen {
                            needed: amount,
                            frozen: source.frozen,
                        });
                    }
                }
            }
        }

        // Work on copies so an unrepresentable result leaves nothing behind.
        let mut source = self.get(from, asset);
        match kind {
            TransferKind::AvailableToAvailable | TransferKind::AvailableToFrozen => {
                source.available = exact_sub(source.available, amount)?;
            }
            TransferKind::FrozenToAvailable => source.frozen = exact_sub(source.frozen, amount)?,
        }
        let mut target = if from == to { source } else { self.get(to, asset) };
        match kind {
            TransferKind::AvailableToAvailable | TransferKind::FrozenToAvailable => {
                target.available = exact_add(target.available, amount)?;
            }
            TransferKind::AvailableToFrozen => target.frozen = exact_add(target.frozen, amount)?,
        }
        *self.entry(from, asset) = source;
        *self.entry(to, asset) = target;
        Ok(())
    }

    /// Checked transfer between two users.
    pub fn transfer(
        &mut self,
        kind: TransferKind,
        from: UserId,
        to: UserId,
        asset: AssetKind,
        amount: Decimal,
    ) -> Result<()> {
        self.try_transfer(kind, from, to, asset, amount, true)
    }

    /// Freeze funds (available → frozen) for an order.
    pub fn freeze(&mut self, user_id: UserId, asset: AssetKind, amount: Decimal) -> Result<()> {
        self.try_transfer(
            TransferKind::AvailableToFrozen,
            user_id,
            user_id,
            asset,
            amount,
            true,
        )
    }

    /// Unfreeze funds (frozen → available).
    pub fn unfreeze(&mut self, user_id: UserId, asset: AssetKind, amount: Decimal) -> Result<()> {
        self.try_transfer(
            TransferKind::FrozenToAvailable,
            user_id,
            user_id,
            asset,
            amount,
            true,
        )
    }

    fn entry(&mut self, user_id: UserId, asset: AssetKind) -> &mut Asset {
        self.assets
            .entry(user_id)
            .or_default()
            .entry(asset)
            .or_default()
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Balance of a (user, asset) pair; zero if never touched.
    #[must_use]
    pub fn get(&self, user_id: UserId, asset: AssetKind) -> Asset {
        self.assets
            .get(&user_id)
            .and_then(|m| m.get(&asset))
            .copied()
            .unwrap_or_default()
    }

    /// All balances of one user.
    #[must_use]
    pub fn user_assets(&self, user_id: UserId) -> Option<&BTreeMap<AssetKind, Asset>> {
        self.assets.get(&user_id)
    }

    /// Every balance entry in (user, asset) order.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, AssetKind, &Asset)> {
        self.assets
            .iter()
            .flat_map(|(user, m)| m.iter().map(move |(kind, asset)| (*user, *kind, asset)))
    }

    /// Sum of `available + frozen` of an asset over every user, including
    /// the debt account. Zero for a consistent ledger.
    #[must_use]
    pub fn total(&self, asset: AssetKind) -> Decimal {
        self.iter()
            .filter(|(_, kind, _)| *kind == asset)
            .map(|(_, _, entry)| entry.total())
            .sum()
    }
}
