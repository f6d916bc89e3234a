//! The trading engine state machine.
//!
//! ```text
//! process_event(e):
//!   halted                      -> Err(EngineHalted), no change
//!   e.seq <= last               -> duplicate, ignored
//!   e.previous > last           -> gap: replay from store, then continue
//!   e.previous != last          -> ChainBroken (fatal)
//!   otherwise                   -> dispatch, last = e.seq
//! ```
//!
//! Every error that escapes event application latches the engine halted.
//! Recoverable conditions (underfunded orders, foreign cancels, rejected
//! withdrawals) are logged and absorbed inside dispatch.

use std::fmt::Write as _;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use tradecore_ledger::{
    AssetService, OrderService, TransferKind, clear_cancel_order, clear_match_result,
};
use tradecore_matchcore::MatchEngine;
use tradecore_store::EventStore;
use tradecore_types::{
    AssetKind, Direction, EngineConfig, Event, EventPayload, Notification, Order, OrderBookSnapshot,
    OrderId, Result, SequenceId, Tick, TradecoreError, TransferDirection, UserId,
};

use crate::{BatchOutput, determinism, validation};

/// Errors from matching or clearing mean books, orders and balances no
/// longer agree.
fn integrity(err: TradecoreError) -> TradecoreError {
    if err.is_fatal() {
        err
    } else {
        TradecoreError::InvariantViolation {
            reason: err.to_string(),
        }
    }
}

pub struct TradingEngine {
    config: EngineConfig,
    store: Arc<dyn EventStore>,

    assets: AssetService,
    orders: OrderService,
    match_engine: MatchEngine,

    last_sequence_id: SequenceId,
    fatal_error: Option<String>,

    // Per-batch output.
    order_book_changed: bool,
    last_event_at: i64,
    ticks: Vec<Tick>,
    notifications: Vec<Notification>,

    /// Closed orders waiting for archival.
    closed_orders: Vec<Order>,
}

impl TradingEngine {
    /// A cold engine at sequence 0.
    #[must_use]
    pub fn new(config: EngineConfig, store: Arc<dyn EventStore>) -> Self {
        Self {
            config,
            store,
            assets: AssetService::new(),
            orders: OrderService::new(),
            match_engine: MatchEngine::new(),
            last_sequence_id: 0,
            fatal_error: None,
            order_book_changed: false,
            last_event_at: 0,
            ticks: Vec::new(),
            notifications: Vec::new(),
            closed_orders: Vec::new(),
        }
    }

    // =================================================================
    // Event application
    // =================================================================

    /// Apply a batch in order and collect its output.
    pub fn process_events(&mut self, events: &[Event]) -> Result<BatchOutput> {
        self.ensure_running()?;
        self.order_book_changed = false;
        for event in events {
            self.process_event(event)?;
        }
        Ok(self.take_output())
    }

    /// Apply one event under the chain rules.
    pub fn process_event(&mut self, event: &Event) -> Result<()> {
        self.ensure_running()?;
        match self.apply(event, true) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.halt(&err);
                Err(err)
            }
        }
    }

    /// Replay everything the store holds past `last_sequence_id`.
    /// Returns the number of events applied.
    pub fn recover(&mut self) -> Result<u64> {
        self.ensure_running()?;
        let start = self.last_sequence_id;
        match self.replay_from_store() {
            Ok(()) => {
                let applied = self.last_sequence_id - start;
                info!(from = start, to = self.last_sequence_id, applied, "engine recovered");
                Ok(applied)
            }
            Err(err) => {
                self.halt(&err);
                Err(err)
            }
        }
    }

    fn ensure_running(&self) -> Result<()> {
        match &self.fatal_error {
            Some(reason) => Err(TradecoreError::EngineHalted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn halt(&mut self, err: &TradecoreError) {
        error!(
            last_sequence_id = self.last_sequence_id,
            error = %err,
            "fatal error, engine halted"
        );
        self.fatal_error = Some(err.to_string());
    }

    fn apply(&mut self, event: &Event, heal_gaps: bool) -> Result<()> {
        if event.sequence_id <= self.last_sequence_id {
            warn!(
                sequence_id = event.sequence_id,
                last_sequence_id = self.last_sequence_id,
                "duplicate event ignored"
            );
            return Ok(());
        }
        if event.previous_id > self.last_sequence_id {
            if !heal_gaps {
                return Err(TradecoreError::LostEvents {
                    last_sequence_id: self.last_sequence_id,
                });
            }
            warn!(
                expected = self.last_sequence_id,
                actual = event.previous_id,
                sequence_id = event.sequence_id,
                "event lost, replaying from store"
            );
            return self.heal_gap(event);
        }
        if event.previous_id != self.last_sequence_id {
            return Err(TradecoreError::ChainBroken {
                sequence_id: event.sequence_id,
                expected: self.last_sequence_id,
                actual: event.previous_id,
            });
        }

        debug!(
            from = self.last_sequence_id,
            to = event.sequence_id,
            kind = event.payload.kind(),
            "process event"
        );
        self.dispatch(event)?;
        self.last_sequence_id = event.sequence_id;
        self.last_event_at = event.created_at;

        if self.config.validate_each_event {
            self.validate()?;
            debug!(state = %self.debug_dump(), "validated");
        }
        Ok(())
    }

    /// Replayed events are applied without further gap healing: a hole
    /// inside the store itself cannot be repaired by reading it again.
    fn heal_gap(&mut self, event: &Event) -> Result<()> {
        self.replay_from_store()?;
        if self.last_sequence_id >= event.sequence_id {
            return Ok(());
        }
        // The store ended before this event; it may still link on.
        self.apply(event, false)
    }

    fn replay_from_store(&mut self) -> Result<()> {
        let limit = self.config.replay_limit;
        loop {
            let records = self.store.load_events_after(self.last_sequence_id, limit)?;
            let full_page = records.len() >= limit;
            for record in &records {
                self.apply(&record.to_event()?, false)?;
            }
            if !full_page {
                return Ok(());
            }
        }
    }

    // =================================================================
    // Dispatch
    // =================================================================

    fn dispatch(&mut self, event: &Event) -> Result<()> {
        match &event.payload {
            EventPayload::OrderRequest {
                user_id,
                direction,
                price,
                quantity,
            } => self.create_order(event, *user_id, *direction, *price, *quantity),
            EventPayload::OrderCancel { user_id, order_id } => {
                self.cancel_order(event, *user_id, *order_id)
            }
            EventPayload::Transfer {
                user_id,
                asset,
                amount,
                direction,
            } => {
                self.transfer(*user_id, *asset, *amount, *direction);
                Ok(())
            }
        }
    }

    fn create_order(
        &mut self,
        event: &Event,
        user_id: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<()> {
        if user_id.is_debt() {
            warn!(sequence_id = event.sequence_id, "debt account cannot trade");
            return Ok(());
        }
        let order_id = OrderId::derive(event.sequence_id, event.created_at);
        let created = self.orders.create_order(
            &mut self.assets,
            event.sequence_id,
            event.created_at,
            order_id,
            user_id,
            direction,
            price,
            quantity,
        );
        let order = match created {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(
                    sequence_id = event.sequence_id,
                    user = %user_id,
                    %direction,
                    %price,
                    %quantity,
                    "insufficient funds, order dropped"
                );
                return Ok(());
            }
            Err(err) if !err.is_fatal() => {
                warn!(sequence_id = event.sequence_id, user = %user_id, error = %err, "order rejected");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let result = self
            .match_engine
            .process_order(event.sequence_id, order.id, self.orders.arena_mut())
            .map_err(integrity)?;
        let closed = clear_match_result(&mut self.assets, &mut self.orders, &result)
            .map_err(integrity)?;

        self.order_book_changed = true;
        for detail in &result.details {
            self.ticks.push(Tick {
                sequence_id: event.sequence_id,
                taker_order_id: result.taker.id,
                maker_order_id: detail.maker.id,
                taker_direction: result.taker.direction,
                price: detail.price,
                quantity: detail.quantity,
                created_at: event.created_at,
            });
        }
        self.record_closed(closed, event.created_at);
        Ok(())
    }

    fn cancel_order(&mut self, event: &Event, user_id: UserId, order_id: OrderId) -> Result<()> {
        match self.orders.get(order_id) {
            None => {
                warn!(sequence_id = event.sequence_id, order = %order_id, "cancel of unknown order ignored");
                return Ok(());
            }
            Some(order) if order.user_id != user_id => {
                warn!(
                    sequence_id = event.sequence_id,
                    order = %order_id,
                    owner = %order.user_id,
                    user = %user_id,
                    "cancel of foreign order ignored"
                );
                return Ok(());
            }
            Some(_) => {}
        }

        let cancelled = self
            .match_engine
            .cancel(event.created_at, order_id, self.orders.arena_mut())
            .map_err(integrity)?;
        clear_cancel_order(&mut self.assets, &mut self.orders, &cancelled).map_err(integrity)?;
        self.order_book_changed = true;
        self.record_closed(vec![cancelled], event.created_at);
        Ok(())
    }

    fn transfer(
        &mut self,
        user_id: UserId,
        asset: AssetKind,
        amount: Decimal,
        direction: TransferDirection,
    ) {
        if user_id.is_debt() {
            warn!(%asset, %amount, "transfer to the debt account itself ignored");
            return;
        }
        let transferred = match direction {
            TransferDirection::Deposit => self.assets.try_transfer(
                TransferKind::AvailableToAvailable,
                UserId::DEBT,
                user_id,
                asset,
                amount,
                false,
            ),
            TransferDirection::Withdraw => self.assets.try_transfer(
                TransferKind::AvailableToAvailable,
                user_id,
                UserId::DEBT,
                asset,
                amount,
                true,
            ),
        };
        if let Err(err) = transferred {
            warn!(user = %user_id, %asset, %amount, ?direction, error = %err, "transfer rejected");
        }
    }

    fn record_closed(&mut self, closed: Vec<Order>, created_at: i64) {
        for order in closed {
            self.notifications
                .push(Notification::order_closed(order.clone(), created_at));
            self.closed_orders.push(order);
        }
    }

    fn take_output(&mut self) -> BatchOutput {
        let mut notifications = std::mem::take(&mut self.notifications);
        let order_book = if self.order_book_changed {
            let snapshot = self.order_book(self.config.order_book_depth);
            notifications.push(Notification::order_book(snapshot.clone(), self.last_event_at));
            Some(snapshot)
        } else {
            None
        };
        self.order_book_changed = false;
        BatchOutput {
            order_book,
            ticks: std::mem::take(&mut self.ticks),
            notifications,
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn last_sequence_id(&self) -> SequenceId {
        self.last_sequence_id
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.fatal_error.is_some()
    }

    #[must_use]
    pub fn halt_reason(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    #[must_use]
    pub fn assets(&self) -> &AssetService {
        &self.assets
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    #[must_use]
    pub fn match_engine(&self) -> &MatchEngine {
        &self.match_engine
    }

    /// Depth-limited snapshot of both books, stamped with the last applied
    /// sequence id.
    #[must_use]
    pub fn order_book(&self, max_depth: usize) -> OrderBookSnapshot {
        let mut snapshot = self.match_engine.order_book(max_depth, self.orders.arena());
        snapshot.sequence_id = self.last_sequence_id;
        snapshot
    }

    /// Hand closed orders to the archival collaborator, oldest first.
    pub fn drain_closed_orders(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.closed_orders)
    }

    /// Run every invariant check against the current state.
    pub fn validate(&self) -> Result<()> {
        validation::validate(&self.assets, &self.orders, &self.match_engine)
    }

    /// Hex SHA-256 over the full engine state.
    #[must_use]
    pub fn state_digest(&self) -> String {
        determinism::state_digest(
            self.last_sequence_id,
            &self.assets,
            &self.orders,
            &self.match_engine,
        )
    }

    /// Human-readable dump for validation-mode logging.
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "last_sequence_id = {}", self.last_sequence_id);
        for (user, kind, asset) in self.assets.iter() {
            let _ = writeln!(out, "  {user} {kind} {asset}");
        }
        for order in self.orders.arena().iter() {
            let _ = writeln!(out, "  {order}");
        }
        let _ = write!(out, "{}", self.match_engine);
        out
    }
}

#[cfg(test)]
mod tests {
    use tradecore_store::{EventRecord, MemoryStore};
    use tradecore_types::*;

    use super::*;

    // 2024-03-15T00:00:00Z
    const T0: i64 = 1_710_460_800_000;
    const ALICE: UserId = UserId(1000);
    const BOB: UserId = UserId(1001);

    fn d(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn deposit(user: UserId, asset: AssetKind, amount: i64) -> EventPayload {
        EventPayload::Transfer {
            user_id: user,
            asset,
            amount: d(amount),
            direction: TransferDirection::Deposit,
        }
    }

    fn order(user: UserId, direction: Direction, price: i64, quantity: i64) -> EventPayload {
        EventPayload::OrderRequest {
            user_id: user,
            direction,
            price: d(price),
            quantity: d(quantity),
        }
    }

    fn chain(payloads: Vec<EventPayload>) -> Vec<Event> {
        payloads
            .into_iter()
            .enumerate()
            .map(|(i, p)| Event::chained(i as u64 + 1, T0, p))
            .collect()
    }

    fn engine_with(store: Arc<MemoryStore>) -> TradingEngine {
        let config = EngineConfig {
            validate_each_event: true,
            ..EngineConfig::default()
        };
        TradingEngine::new(config, store)
    }

    fn engine() -> TradingEngine {
        engine_with(Arc::new(MemoryStore::new()))
    }

    fn funded_events() -> Vec<EventPayload> {
        vec![
            deposit(ALICE, AssetKind::Usd, 10_000),
            deposit(ALICE, AssetKind::Btc, 10),
            deposit(BOB, AssetKind::Usd, 10_000),
            deposit(BOB, AssetKind::Btc, 10),
        ]
    }

    #[test]
    fn deposit_funds_from_debt() {
        let mut engine = engine();
        engine.process_events(&chain(funded_events())).unwrap();
        assert_eq!(engine.last_sequence_id(), 4);
        assert_eq!(engine.assets().get(ALICE, AssetKind::Usd).available, d(10_000));
        assert_eq!(engine.assets().get(UserId::DEBT, AssetKind::Usd).available, d(-20_000));
    }

    #[test]
    fn order_id_is_derived_from_event() {
        let mut payloads = funded_events();
        payloads.push(order(ALICE, Direction::Buy, 100, 1));
        let mut engine = engine();
        engine.process_events(&chain(payloads)).unwrap();
        let expected = OrderId::derive(5, T0);
        assert_eq!(expected, OrderId(5 * 1000 + 202_403));
        assert!(engine.orders().get(expected).is_some());
    }

    #[test]
    fn match_produces_ticks_notifications_and_snapshot() {
        let mut payloads = funded_events();
        payloads.push(order(ALICE, Direction::Sell, 100, 2));
        payloads.push(order(BOB, Direction::Buy, 101, 1));
        let mut engine = engine();
        let output = engine.process_events(&chain(payloads)).unwrap();

        assert_eq!(output.ticks.len(), 1);
        assert_eq!(output.ticks[0].price, d(100));
        assert_eq!(output.ticks[0].taker_direction, Direction::Buy);

        let book = output.order_book.unwrap();
        assert_eq!(book.price, d(100));
        assert_eq!(book.sell, vec![OrderBookLevel { price: d(100), quantity: d(1) }]);
        assert!(book.buy.is_empty());

        // Taker closed (per-user), then the book broadcast.
        assert_eq!(output.notifications.len(), 2);
        assert_eq!(output.notifications[0].user_id, Some(BOB));
        assert!(output.notifications[1].is_broadcast());

        let closed = engine.drain_closed_orders();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].status, OrderStatus::FullyFilled);
        assert!(engine.drain_closed_orders().is_empty());
    }

    #[test]
    fn transfers_only_batch_has_no_snapshot() {
        let mut engine = engine();
        let output = engine.process_events(&chain(funded_events())).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn underfunded_order_is_dropped_but_sequence_advances() {
        let mut engine = engine();
        engine
            .process_events(&chain(vec![
                deposit(ALICE, AssetKind::Usd, 100),
                order(ALICE, Direction::Buy, 100, 2),
            ]))
            .unwrap();
        assert_eq!(engine.last_sequence_id(), 2);
        assert!(engine.orders().is_empty());
        assert!(engine.match_engine().buy_book.is_empty());
        let usd = engine.assets().get(ALICE, AssetKind::Usd);
        assert_eq!((usd.available, usd.frozen), (d(100), Decimal::ZERO));
    }

    #[test]
    fn cancel_releases_funds() {
        let mut payloads = funded_events();
        payloads.push(order(ALICE, Direction::Buy, 100, 3));
        let mut engine = engine();
        engine.process_events(&chain(payloads)).unwrap();
        let order_id = OrderId::derive(5, T0);
        assert_eq!(engine.assets().get(ALICE, AssetKind::Usd).frozen, d(300));

        let cancel = Event::chained(6, T0 + 1, EventPayload::OrderCancel { user_id: ALICE, order_id });
        let output = engine.process_events(&[cancel]).unwrap();

        assert_eq!(engine.assets().get(ALICE, AssetKind::Usd).frozen, Decimal::ZERO);
        assert_eq!(engine.assets().get(ALICE, AssetKind::Usd).available, d(10_000));
        assert!(engine.orders().is_empty());
        assert!(output.order_book.is_some());
        let closed = engine.drain_closed_orders();
        assert_eq!(closed[0].status, OrderStatus::Cancelled);
        assert_eq!(closed[0].updated_at, T0 + 1);
    }

    #[test]
    fn foreign_or_unknown_cancel_is_ignored() {
        let mut payloads = funded_events();
        payloads.push(order(ALICE, Direction::Sell, 100, 1));
        let order_id = OrderId::derive(5, T0);
        payloads.push(EventPayload::OrderCancel { user_id: BOB, order_id });
        payloads.push(EventPayload::OrderCancel { user_id: ALICE, order_id: OrderId(42) });
        let mut engine = engine();
        engine.process_events(&chain(payloads)).unwrap();

        assert_eq!(engine.last_sequence_id(), 7);
        assert!(engine.orders().get(order_id).is_some());
        assert_eq!(engine.assets().get(ALICE, AssetKind::Btc).frozen, d(1));
    }

    #[test]
    fn over_withdraw_is_skipped() {
        let mut engine = engine();
        engine
            .process_events(&chain(vec![
                deposit(ALICE, AssetKind::Btc, 2),
                EventPayload::Transfer {
                    user_id: ALICE,
                    asset: AssetKind::Btc,
                    amount: d(3),
                    direction: TransferDirection::Withdraw,
                },
                EventPayload::Transfer {
                    user_id: ALICE,
                    asset: AssetKind::Btc,
                    amount: d(1),
                    direction: TransferDirection::Withdraw,
                },
            ]))
            .unwrap();
        assert_eq!(engine.assets().get(ALICE, AssetKind::Btc).available, d(1));
        assert_eq!(engine.assets().get(UserId::DEBT, AssetKind::Btc).available, d(-1));
    }

    #[test]
    fn duplicate_event_is_ignored() {
        let events = chain(funded_events());
        let mut engine = engine();
        engine.process_events(&events).unwrap();
        let digest = engine.state_digest();
        engine.process_events(&events[1..3]).unwrap();
        engine.process_event(&events[3]).unwrap();
        assert_eq!(engine.state_digest(), digest);
    }

    #[test]
    fn gap_is_healed_from_store() {
        let events = chain(funded_events());
        let store = Arc::new(MemoryStore::new());
        let records: Vec<EventRecord> = events.iter().map(|e| EventRecord::from_event(e).unwrap()).collect();
        store.append(&[], &records).unwrap();

        let mut engine = engine_with(store);
        engine.process_events(&events[..2]).unwrap();
        // Event 3 is never delivered.
        engine.process_event(&events[3]).unwrap();
        assert_eq!(engine.last_sequence_id(), 4);
        assert_eq!(engine.assets().get(BOB, AssetKind::Usd).available, d(10_000));
    }

    #[test]
    fn unrecoverable_gap_halts() {
        let events = chain(funded_events());
        let mut engine = engine();
        engine.process_event(&events[0]).unwrap();
        let err = engine.process_event(&events[2]).unwrap_err();
        assert!(matches!(err, TradecoreError::LostEvents { last_sequence_id: 1 }));
        assert!(engine.is_halted());

        // Terminal: even a valid next event is refused without change.
        let err = engine.process_event(&events[1]).unwrap_err();
        assert!(matches!(err, TradecoreError::EngineHalted { .. }));
        assert_eq!(engine.last_sequence_id(), 1);
        assert!(engine.process_events(&[]).is_err());
    }

    #[test]
    fn broken_chain_halts() {
        let mut engine = engine();
        engine.process_events(&chain(funded_events())).unwrap();
        let mut bad = Event::chained(6, T0, deposit(ALICE, AssetKind::Usd, 1));
        bad.previous_id = 3;
        let err = engine.process_event(&bad).unwrap_err();
        assert!(matches!(
            err,
            TradecoreError::ChainBroken { sequence_id: 6, expected: 4, actual: 3 }
        ));
        assert!(engine.halt_reason().unwrap().contains("TC_ERR_401"));
    }

    #[test]
    fn recover_replays_whole_store() {
        let events = chain(funded_events());
        let store = Arc::new(MemoryStore::new());
        let records: Vec<EventRecord> = events.iter().map(|e| EventRecord::from_event(e).unwrap()).collect();
        store.append(&[], &records).unwrap();

        let mut engine = engine_with(store);
        assert_eq!(engine.recover().unwrap(), 4);
        assert_eq!(engine.last_sequence_id(), 4);
        assert_eq!(engine.recover().unwrap(), 0);
    }

    #[test]
    fn replay_pages_through_small_limit() {
        let events = chain(funded_events());
        let store = Arc::new(MemoryStore::new());
        let records: Vec<EventRecord> = events.iter().map(|e| EventRecord::from_event(e).unwrap()).collect();
        store.append(&[], &records).unwrap();

        let config = EngineConfig {
            replay_limit: 3,
            ..EngineConfig::default()
        };
        let mut engine = TradingEngine::new(config, store);
        engine.process_event(&events[3]).unwrap();
        assert_eq!(engine.last_sequence_id(), 4);
    }

    #[test]
    fn debug_dump_lists_state() {
        let mut payloads = funded_events();
        payloads.push(order(ALICE, Direction::Sell, 100, 1));
        let mut engine = engine();
        engine.process_events(&chain(payloads)).unwrap();
        let dump = engine.debug_dump();
        assert!(dump.contains("last_sequence_id = 5"));
        assert!(dump.contains("user:debt"));
        assert!(dump.contains("SELL"));
    }

    fn exact_order(
        user: UserId,
        direction: Direction,
        price: Decimal,
        quantity: Decimal,
    ) -> EventPayload {
        EventPayload::OrderRequest {
            user_id: user,
            direction,
            price,
            quantity,
        }
    }

    #[test]
    fn oversized_order_is_rejected_without_state_change() {
        let mut engine = engine();
        let events = chain(vec![
            deposit(ALICE, AssetKind::Usd, 1000),
            exact_order(ALICE, Direction::Buy, Decimal::MAX, d(2)),
        ]);
        engine.process_events(&events).unwrap();
        assert_eq!(engine.last_sequence_id(), 2);
        assert!(!engine.is_halted());
        assert!(engine.orders().is_empty());
        let usd = engine.assets().get(ALICE, AssetKind::Usd);
        assert_eq!(usd.available, d(1000));
        assert_eq!(usd.frozen, Decimal::ZERO);

        // Replaying the same history reaches the same state.
        let mut replayed = self::engine();
        replayed.process_events(&events).unwrap();
        assert_eq!(replayed.state_digest(), engine.state_digest());
    }

    #[test]
    fn order_below_resolution_is_rejected() {
        let tiny = Decimal::new(1, 16);
        let mut engine = engine();
        engine
            .process_events(&chain(vec![
                deposit(ALICE, AssetKind::Usd, 1000),
                exact_order(ALICE, Direction::Buy, tiny, tiny),
            ]))
            .unwrap();
        assert_eq!(engine.last_sequence_id(), 2);
        assert!(!engine.is_halted());
        assert!(engine.orders().is_empty());
        assert_eq!(engine.assets().get(ALICE, AssetKind::Usd).frozen, Decimal::ZERO);
    }

    #[test]
    fn invariant_violation_latches_halt() {
        let events = chain(funded_events());
        let mut engine = engine();
        engine.process_event(&events[0]).unwrap();
        // Frozen funds with no order behind them.
        engine.assets.freeze(ALICE, AssetKind::Usd, d(5)).unwrap();

        let err = engine.process_event(&events[1]).unwrap_err();
        assert!(matches!(err, TradecoreError::InvariantViolation { .. }));
        assert!(engine.is_halted());
        assert!(engine.halt_reason().unwrap().contains("TC_ERR_"));

        let err = engine.process_event(&events[2]).unwrap_err();
        assert!(matches!(err, TradecoreError::EngineHalted { .. }));
        assert_eq!(engine.last_sequence_id(), 2);
        let err = engine.process_events(&events[3..]).unwrap_err();
        assert!(matches!(err, TradecoreError::EngineHalted { .. }));
    }

    #[test]
    fn debt_account_cannot_trade_or_transfer() {
        let mut payloads = funded_events();
        payloads.extend([
            order(UserId::DEBT, Direction::Buy, 100, 1),
            order(UserId::DEBT, Direction::Sell, 100, 1),
            deposit(UserId::DEBT, AssetKind::Usd, 50),
            EventPayload::Transfer {
                user_id: UserId::DEBT,
                asset: AssetKind::Btc,
                amount: d(1),
                direction: TransferDirection::Withdraw,
            },
        ]);
        let mut engine = engine();
        let output = engine.process_events(&chain(payloads)).unwrap();
        assert_eq!(engine.last_sequence_id(), 8);
        assert!(!engine.is_halted());
        assert!(engine.orders().is_empty());
        assert!(output.ticks.is_empty());
        let debt_usd = engine.assets().get(UserId::DEBT, AssetKind::Usd);
        assert_eq!(debt_usd.available, d(-20_000));
        assert_eq!(debt_usd.frozen, Decimal::ZERO);
        assert_eq!(engine.assets().get(UserId::DEBT, AssetKind::Btc).available, d(-20));
    }
}
