//! # tradecore-store
//!
//! Persistence boundary of the exchange core: an append-only event log
//! keyed by sequence id plus a table of client idempotency keys.
//!
//! The [`EventStore`] trait is the whole contract. Two implementations:
//!
//! - [`MemoryStore`]: for tests and single-process runs without durability
//! - [`FileStore`]: JSON-lines journal, one fsync'd line per batch
//!
//! A batch of events and its unique keys is committed atomically: either
//! everything becomes visible, or nothing does.

pub mod file;
mod index;
pub mod memory;
pub mod record;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{EventRecord, UniqueKeyRecord};
pub use traits::EventStore;
