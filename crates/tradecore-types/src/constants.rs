//! System-wide constants for the tradecore exchange core.

/// Internal user id of the system debt account.
///
/// The debt account is the counterparty of every deposit; its available
/// balance is never positive and its frozen balance is always zero.
pub const DEBT_USER_ID: u64 = 1;

/// Multiplier applied to the sequence id when deriving an order id.
///
/// `order_id = sequence_id * ORDER_ID_SEQUENCE_FACTOR + (year * 100 + month)`
pub const ORDER_ID_SEQUENCE_FACTOR: u64 = 1000;

/// Maximum decimal places accepted for an order price.
pub const PRICE_PRECISION: u32 = 8;

/// Maximum decimal places accepted for an order quantity.
pub const QTY_PRECISION: u32 = 8;

/// Largest `price × quantity` an order may carry, in whole quote units.
///
/// With both factors limited to 8 decimal places, every product the engine
/// forms from an admitted order stays below 10^28 in the 96-bit mantissa,
/// so matching and clearing never round.
pub const MAX_ORDER_NOTIONAL: i64 = 1_000_000_000_000;

/// Default number of price levels per side in a published order book.
pub const DEFAULT_ORDER_BOOK_DEPTH: usize = 100;

/// Upper bound on the number of events loaded from the store in one
/// gap-recovery query.
pub const DEFAULT_REPLAY_LIMIT: usize = 1_000_000;

/// Maximum requests the sequencer accepts in a single batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Default capacity of the in-process message bus between sequencer and engine.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "tradecore";
