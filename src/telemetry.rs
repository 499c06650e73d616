//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `insight_core=debug`.
pub const LOG_ENV: &str = "INSIGHT_LOG";

/// Install a stderr `tracing` subscriber. `INSIGHT_LOG` wins over
/// `default_level`, which falls back to `info`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_level: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level.unwrap_or("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
