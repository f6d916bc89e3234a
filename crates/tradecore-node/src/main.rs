//! # tradecore-node
//!
//! Single-process exchange core. Usage: `tradecore-node [config.json]`.
//!
//! Newline-delimited JSON `EventRequest`s arrive on stdin; order books,
//! ticks and order notifications are published to the log.

mod bus;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};
use tradecore_engine::TradingEngine;
use tradecore_sequencer::{Sequencer, SystemClock};
use tradecore_store::{EventStore, FileStore, MemoryStore};
use tradecore_types::{NodeConfig, Result, TradecoreError, constants};

fn load_config() -> Result<NodeConfig> {
    match std::env::args().nth(1) {
        Some(path) => NodeConfig::load(path),
        None => Ok(NodeConfig::default()),
    }
}

fn open_store(config: &NodeConfig) -> Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match &config.store.path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

async fn run(config: NodeConfig) -> Result<()> {
    let store = open_store(&config)?;
    let sequencer = Arc::new(Sequencer::new(
        Arc::clone(&store),
        Arc::new(SystemClock),
        config.sequencer.clone(),
    )?);

    let mut engine = TradingEngine::new(config.engine.clone(), store);
    engine.recover()?;

    let (tx, rx) = mpsc::channel(config.bus_capacity);
    let consumer = tokio::spawn(bus::run_engine(engine, rx));

    let reader = BufReader::new(tokio::io::stdin());
    let intake = bus::intake(reader, sequencer, config.sequencer.max_batch_size, tx).await;

    // The bus sender is gone once intake returns, so the engine task drains
    // what is left and finishes.
    let engine = consumer
        .await
        .map_err(|e| TradecoreError::Internal(format!("engine task failed: {e}")))??;
    let published = intake?;
    info!(
        published,
        last_sequence_id = engine.last_sequence_id(),
        "node stopped"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    logging::init(config.log_format);
    info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        store = ?config.store.path,
        "starting"
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, fatal = err.is_fatal(), "node failed");
            ExitCode::FAILURE
        }
    }
}
