//! # tradecore-matchcore
//!
//! **Pure deterministic matching engine for tradecore.**
//!
//! MatchCore takes an admitted taker order and matches it against the
//! resting orders on the opposite side with price/time priority. It has:
//!
//! - **Zero side effects**: no store access, no balance checks
//! - **Deterministic output**: same book + same order -> same result
//! - **Arena addressing**: books hold [`OrderId`](tradecore_types::OrderId)s;
//!   order state lives in the caller's [`OrderArena`](tradecore_types::OrderArena)

pub mod engine;
pub mod orderbook;
pub mod price_level;

pub use engine::MatchEngine;
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
