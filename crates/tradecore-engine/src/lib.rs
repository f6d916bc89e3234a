//! # tradecore-engine
//!
//! **The single logical writer of the exchange core.**
//!
//! [`TradingEngine`] consumes sequenced events strictly in chain order and
//! drives order admission, matching and clearing for each one. It:
//!
//! - discards duplicates and heals gaps by replaying from the event store
//! - latches a terminal halted state on any integrity fault
//! - optionally re-checks every cross-component invariant after each event
//! - publishes an order-book snapshot, ticks and per-user notifications
//!   per batch
//!
//! Recovery after restart is not a separate path: an engine starting at
//! sequence 0 pulls everything it missed from the store on the first
//! event it sees, or eagerly via [`TradingEngine::recover`].

pub mod determinism;
pub mod engine;
pub mod output;
pub mod validation;

pub use determinism::state_digest;
pub use engine::TradingEngine;
pub use output::BatchOutput;
