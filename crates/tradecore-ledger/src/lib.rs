//! # tradecore-ledger
//!
//! **Balance plane of the tradecore engine.**
//!
//! - [`AssetService`]: per-(user, asset) available/frozen balances, with the
//!   debt account as the negative counterparty of every deposit
//! - [`OrderService`]: order admission (pre-freezes funds) and the active
//!   order index
//! - [`clearing`]: turns match results and cancellations into ledger moves
//!
//! All mutation is single-threaded; callers serialize access through the
//! trading engine.

pub mod asset_service;
pub mod clearing;
pub mod order_service;

pub use asset_service::{AssetService, TransferKind};
pub use clearing::{clear_cancel_order, clear_match_result};
pub use order_service::OrderService;
