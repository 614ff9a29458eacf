//! Tracing subscriber setup.

use soawatch_monitor::config::TelemetryConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the configured level; each `-v` raises it instead.
pub fn init(config: &TelemetryConfig, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // Already installed, e.g. by a test harness
    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber not installed");
    }
}
