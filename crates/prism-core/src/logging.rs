//! Logging initialization.
//!
//! Structured logging via the `tracing` ecosystem, with a human-readable
//! pretty format and a JSON format for machine consumption. Output goes to
//! stderr; stdout is left to the caller's data.

use crate::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem at the given default level.
///
/// `RUST_LOG` overrides `level` when set. Calling this twice panics (the
/// global subscriber can only be installed once), so it belongs in the
/// process entry point, not library code paths.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section of a [`Config`].
pub fn init_from_config(config: &Config) {
    init(&config.logging.level, config.logging.format == "json");
}
