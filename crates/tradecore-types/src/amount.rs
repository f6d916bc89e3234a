//! Exact decimal arithmetic for ledger amounts.
//!
//! `rust_decimal` panics on overflow through the operators and silently
//! rounds any result whose digits do not fit its 96-bit mantissa or its
//! 28 fractional places. Money must never do either, so every product and
//! balance update in the ledger goes through these helpers. A result that
//! would round comes back as `AmountOverflow`.

use rust_decimal::Decimal;

use crate::{Result, TradecoreError};

fn not_exact(a: Decimal, op: &str, b: Decimal) -> TradecoreError {
    TradecoreError::AmountOverflow {
        reason: format!("{a} {op} {b}"),
    }
}

/// `a × b`, exactly.
pub fn exact_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    if a.is_zero() || b.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let (a, b) = (a.normalize(), b.normalize());
    let product = a.checked_mul(b).ok_or_else(|| not_exact(a, "×", b))?;
    // A rounded product comes back with fewer fractional digits.
    if product.scale() != a.scale() + b.scale() {
        return Err(not_exact(a, "×", b));
    }
    Ok(product)
}

/// `a + b`, exactly.
pub fn exact_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    let sum = a.checked_add(b).ok_or_else(|| not_exact(a, "+", b))?;
    if sum.scale() < a.scale().max(b.scale()) {
        return Err(not_exact(a, "+", b));
    }
    Ok(sum)
}

/// `a - b`, exactly.
pub fn exact_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    exact_add(a, -b).map_err(|_| not_exact(a, "-", b))
}
