//! Integration test: randomized order flow with per-event validation.
//!
//! Every cross-component invariant is re-checked after each event; the run
//! ends by replaying the same log into a fresh engine.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tradecore_engine::TradingEngine;
use tradecore_sequencer::{ManualClock, Sequencer};
use tradecore_store::MemoryStore;
use tradecore_types::*;

const T0: i64 = 1_710_460_800_000;
const USERS: u64 = 8;

fn random_request(rng: &mut StdRng, placed: &[(OrderId, UserId)]) -> EventRequest {
    let user = UserId(1000 + rng.gen_range(0..USERS));
    let roll = rng.gen_range(0..100);
    let payload = if roll < 10 {
        EventPayload::Transfer {
            user_id: user,
            asset: if rng.gen_bool(0.5) { AssetKind::Usd } else { AssetKind::Btc },
            amount: Decimal::new(rng.gen_range(1..500), 0),
            direction: if rng.gen_bool(0.7) {
                TransferDirection::Deposit
            } else {
                TransferDirection::Withdraw
            },
        }
    } else if roll < 25 && !placed.is_empty() {
        let (order_id, owner) = placed[rng.gen_range(0..placed.len())];
        // Mostly the owner; sometimes a stranger, which must be ignored.
        let user_id = if rng.gen_bool(0.8) { owner } else { user };
        EventPayload::OrderCancel { user_id, order_id }
    } else {
        EventPayload::OrderRequest {
            user_id: user,
            direction: if rng.gen_bool(0.5) { Direction::Buy } else { Direction::Sell },
            // Two decimal places on price and quantity.
            price: Decimal::new(rng.gen_range(9_500..10_500), 2),
            quantity: Decimal::new(rng.gen_range(1..400), 2),
        }
    };
    EventRequest::new(payload)
}

#[test]
fn random_flow_keeps_every_invariant() {
    let mut rng = StdRng::seed_from_u64(0x7eade);
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0));
    let sequencer = Sequencer::new(store.clone(), clock.clone(), SequencerConfig::default()).unwrap();
    let config = EngineConfig {
        validate_each_event: true,
        order_book_depth: 5,
        ..EngineConfig::default()
    };
    let mut engine = TradingEngine::new(config.clone(), store.clone());

    let seed: Vec<EventRequest> = (0..USERS)
        .flat_map(|i| {
            [AssetKind::Usd, AssetKind::Btc].map(|asset| {
                EventRequest::new(EventPayload::Transfer {
                    user_id: UserId(1000 + i),
                    asset,
                    amount: Decimal::new(1_000, 0),
                    direction: TransferDirection::Deposit,
                })
            })
        })
        .collect();
    engine.process_events(&sequencer.sequence(seed).unwrap()).unwrap();

    let mut placed: Vec<(OrderId, UserId)> = Vec::new();
    let mut ticks = 0usize;
    for _ in 0..200 {
        clock.advance(rng.gen_range(0..50));
        let size = rng.gen_range(1..6);
        let batch: Vec<EventRequest> = (0..size).map(|_| random_request(&mut rng, &placed)).collect();
        let events = sequencer.sequence(batch).unwrap();
        for event in &events {
            if let EventPayload::OrderRequest { user_id, .. } = event.payload {
                placed.push((OrderId::derive(event.sequence_id, event.created_at), user_id));
            }
        }
        let output = engine.process_events(&events).unwrap();
        ticks += output.ticks.len();
        if let Some(book) = &output.order_book {
            assert!(book.buy.len() <= 5 && book.sell.len() <= 5);
            if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
                assert!(bid < ask, "crossed book: {bid} >= {ask}");
            }
        }
    }

    assert!(!engine.is_halted());
    assert!(ticks > 0);
    assert_eq!(engine.last_sequence_id(), sequencer.last_sequence_id());

    let mut replayed = TradingEngine::new(config, store);
    replayed.recover().unwrap();
    assert_eq!(replayed.state_digest(), engine.state_digest());
}
