//! Subscriber setup. `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tradecore_types::LogFormat;

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
