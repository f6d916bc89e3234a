//! # tradecore-sequencer
//!
//! The single authority for event order. Every client request passes
//! through [`Sequencer::sequence`], which:
//!
//! 1. drops requests whose unique id was already consumed
//! 2. assigns `previous_id`/`sequence_id` from a monotonic counter
//! 3. stamps the whole batch with one non-decreasing timestamp
//! 4. persists events and unique keys atomically before returning
//!
//! Only persisted events are ever handed to the trading engine.

pub mod clock;
pub mod sequencer;

pub use clock::{Clock, SystemClock};
pub use sequencer::Sequencer;

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
