//! Logging initialization for pagerpost-daemon.
//!
//! Builds the global `tracing-subscriber` from the `[general]` section.
//! `RUST_LOG`, when set, wins over the configured level.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pagerpost_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called once, before the reactor is attached, so that delivery
/// failures reach the configured output.
///
/// # Formats
///
/// * `"json"` - one JSON object per line (default)
/// * `"pretty"` - multi-line human-readable output
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter = build_filter(&config.log_level);

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)),
        other => Err(anyhow::anyhow!(
            "unknown log format '{}', expected 'json' or 'pretty'",
            other
        )),
    }
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}
