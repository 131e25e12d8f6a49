// src/utils/logging.rs

//! Levelled logging for simulation events: a console layer plus an
//! optional file layer, each with its own minimum level. Initialization
//! is one-shot; later calls are no-ops so repeated runs in one process
//! keep the first configuration.

use std::fs::File;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::config::SimParams;
use crate::engine::events::Event;
use crate::error::SimError;

static INITIALIZED: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILENAME: &str = "sim.log";

fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level).unwrap_or(LevelFilter::INFO)
}

/// Install the global subscriber from the sim parameters. Safe to call
/// more than once; only the first call takes effect.
pub fn init(params: &SimParams) -> Result<(), SimError> {
    if INITIALIZED.set(()).is_err() {
        return Ok(());
    }

    let console = fmt::layer()
        .with_target(false)
        .with_filter(parse_level(&params.console_log_level));

    let file_layer = if params.log_file {
        let filename = params
            .log_filename
            .as_deref()
            .unwrap_or(DEFAULT_LOG_FILENAME);
        let file = File::create(filename)?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(file))
                .with_filter(parse_level(&params.log_level)),
        )
    } else {
        None
    };

    // A subscriber set by the host (e.g. in tests) wins silently.
    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init();
    Ok(())
}

/// Log one batch of book events at DEBUG.
pub fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::Trade(trade) => debug!(
                trade_id = trade.trade_id,
                price = trade.price,
                size = trade.size,
                buy = trade.buy_order_id,
                sell = trade.sell_order_id,
                "trade"
            ),
            Event::NewOrder {
                order_id,
                side,
                size,
                price,
                ..
            } => debug!(
                order_id,
                side = side.label(),
                size,
                price = price.unwrap_or(0.0),
                "new order"
            ),
            Event::Cancel { order_id, .. } => debug!(order_id, "cancel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let params = SimParams::default();
        assert!(init(&params).is_ok());
        assert!(init(&params).is_ok());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("nonsense"), LevelFilter::INFO);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
    }
}
