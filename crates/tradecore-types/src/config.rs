//! Configuration types for tradecore components and the node binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, TradecoreError, constants};

/// Trading engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Price levels per side in the published order book.
    pub order_book_depth: usize,
    /// Run the full invariant validation after every applied event.
    /// Any violation halts the engine.
    pub validate_each_event: bool,
    /// Maximum events loaded from the store in one gap-recovery query.
    pub replay_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_book_depth: constants::DEFAULT_ORDER_BOOK_DEPTH,
            validate_each_event: false,
            replay_limit: constants::DEFAULT_REPLAY_LIMIT,
        }
    }
}

/// Sequencer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Largest batch accepted by a single `sequence` call.
    pub max_batch_size: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: constants::DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Event store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Journal file. `None` keeps the event log in memory.
    pub path: Option<PathBuf>,
}

/// Log output format for the node binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Top-level configuration of a tradecore node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub engine: EngineConfig,
    pub sequencer: SequencerConfig,
    pub store: StoreConfig,
    pub log_format: LogFormat,
    /// Capacity of the sequencer → engine channel, in batches.
    pub bus_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            sequencer: SequencerConfig::default(),
            store: StoreConfig::default(),
            log_format: LogFormat::default(),
            bus_capacity: constants::DEFAULT_BUS_CAPACITY,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TradecoreError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TradecoreError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.order_book_depth == 0 {
            return Err(TradecoreError::Configuration(
                "engine.order_book_depth must be > 0".into(),
            ));
        }
        if self.engine.replay_limit == 0 {
            return Err(TradecoreError::Configuration(
                "engine.replay_limit must be > 0".into(),
            ));
        }
        if self.sequencer.max_batch_size == 0 {
            return Err(TradecoreError::Configuration(
                "sequencer.max_batch_size must be > 0".into(),
            ));
        }
        if self.bus_capacity == 0 {
            return Err(TradecoreError::Configuration(
                "bus_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
