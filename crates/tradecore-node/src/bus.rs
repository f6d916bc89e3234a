//! Sequencer → engine plumbing.
//!
//! ```text
//! stdin (NDJSON) ─► intake ─► Sequencer::sequence ─► mpsc bus ─► engine task ─► push sink
//! ```
//!
//! Only sequenced, persisted batches enter the bus. The engine task is the
//! single consumer and the only writer of engine state.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tradecore_engine::{BatchOutput, TradingEngine};
use tradecore_sequencer::Sequencer;
use tradecore_types::{Event, EventRequest, NotificationKind, Result, TradecoreError};

/// Parse one input line. Blank lines yield `None`.
pub fn parse_request(line: &str) -> Result<Option<EventRequest>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Read requests until EOF, sequence them in batches, publish each batch.
///
/// A batch closes when it is full or when no further input is already
/// buffered, so an interactive session is not held back waiting for more.
/// Returns the number of events published.
pub async fn intake<R>(
    mut reader: BufReader<R>,
    sequencer: Arc<Sequencer>,
    max_batch_size: usize,
    bus: mpsc::Sender<Vec<Event>>,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut published = 0u64;
    let mut batch = Vec::new();
    let mut line = String::new();
    let mut line_no = 0u64;
    loop {
        line.clear();
        let eof = reader.read_line(&mut line).await? == 0;
        if !eof {
            line_no += 1;
            match parse_request(&line) {
                Ok(Some(request)) => batch.push(request),
                Ok(None) => {}
                Err(err) => warn!(line = line_no, error = %err, "unparseable request skipped"),
            }
        }

        let idle = reader.buffer().is_empty();
        if batch.len() >= max_batch_size || ((eof || idle) && !batch.is_empty()) {
            let requests = std::mem::take(&mut batch);
            let sequencer = Arc::clone(&sequencer);
            let events = tokio::task::spawn_blocking(move || sequencer.sequence(requests))
                .await
                .map_err(|e| TradecoreError::Internal(format!("sequencer task failed: {e}")))??;
            if !events.is_empty() {
                published += events.len() as u64;
                if bus.send(events).await.is_err() {
                    warn!("engine task gone, stopping intake");
                    return Ok(published);
                }
            }
        }
        if eof {
            return Ok(published);
        }
    }
}

/// Drain the bus into the engine until every sender is dropped.
/// Any engine error is fatal and ends the task.
pub async fn run_engine(
    mut engine: TradingEngine,
    mut bus: mpsc::Receiver<Vec<Event>>,
) -> Result<TradingEngine> {
    while let Some(events) = bus.recv().await {
        let output = engine.process_events(&events)?;
        publish(&output);
        let archived = engine.drain_closed_orders();
        if !archived.is_empty() {
            debug!(count = archived.len(), "closed orders archived");
        }
    }
    info!(
        last_sequence_id = engine.last_sequence_id(),
        digest = %engine.state_digest(),
        "event bus closed"
    );
    Ok(engine)
}

/// Push sink: the log is the downstream channel.
fn publish(output: &BatchOutput) {
    for tick in &output.ticks {
        info!(
            sequence_id = tick.sequence_id,
            taker = %tick.taker_order_id,
            maker = %tick.maker_order_id,
            side = %tick.taker_direction,
            price = %tick.price,
            quantity = %tick.quantity,
            "tick"
        );
    }
    for notification in &output.notifications {
        match &notification.kind {
            NotificationKind::OrderBook(book) => info!(
                sequence_id = book.sequence_id,
                price = %book.price,
                bid = ?book.best_bid(),
                ask = ?book.best_ask(),
                book = %serde_json::to_string(book).unwrap_or_default(),
                "order book"
            ),
            NotificationKind::OrderMatched(order) | NotificationKind::OrderCanceled(order) => {
                info!(user = ?notification.user_id, order = %order, "order closed");
            }
        }
    }
}
