//! Diagnostic logging to stderr.
//!
//! `DOOR_ORDERS_LOG` takes an `EnvFilter` directive and wins over `-v`.
//! Without either only warnings and errors are shown.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DOOR_ORDERS_LOG";

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. Safe to call once per process; later
/// calls are ignored.
pub fn init(verbosity: u8) {
    let default_directive = format!("door_orders={}", level_for(verbosity));
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
