//! # tradecore-types
//!
//! Shared types, errors, and configuration for the **tradecore** exchange core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`OrderId`], [`SequenceId`]
//! - **Ledger model**: [`AssetKind`], [`Asset`], exact arithmetic ([`exact_mul`])
//! - **Order model**: [`Order`], [`Direction`], [`OrderStatus`], [`OrderArena`]
//! - **Event model**: [`Event`], [`EventPayload`], [`EventRequest`]
//! - **Match output**: [`MatchResult`], [`MatchDetail`]
//! - **Published output**: [`OrderBookSnapshot`], [`Tick`], [`Notification`]
//! - **Configuration**: [`EngineConfig`], [`SequencerConfig`], [`StoreConfig`], [`NodeConfig`]
//! - **Errors**: [`TradecoreError`] with `TC_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod asset;
pub mod book;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod match_result;
pub mod notification;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use tradecore_types::{Order, Direction, Event, Asset, ...};

pub use amount::{exact_add, exact_mul, exact_sub};
pub use asset::*;
pub use book::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use match_result::*;
pub use notification::*;
pub use order::*;

// Constants are accessed via `tradecore_types::constants::FOO`
// (not re-exported to avoid name collisions).
