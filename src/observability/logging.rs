//! # Logging
//!
//! Tracing subscriber setup for host processes embedding the reconcilers.

use crate::config::ControllerConfig;
use crate::constants::DEFAULT_LOG_FILTER;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, then `LOG_LEVEL` scoped to this crate
fn env_filter(config: &ControllerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level.to_ascii_lowercase();
        EnvFilter::try_new(format!("kinesis_analytics_controller={level}"))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    })
}

/// Install a global `fmt` subscriber
///
/// Uses `try_init`: when the host already owns a subscriber this logs a warning
/// through it and returns.
pub fn init_tracing(config: &ControllerConfig) {
    let filter = env_filter(config);
    let result = if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    if let Err(e) = result {
        warn!("Tracing subscriber init returned error (may already be initialized): {}", e);
    }
}
