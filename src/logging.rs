//! tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggerConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level when set. Returns
/// `false` when logging is disabled or a subscriber was already installed.
pub fn init(config: &LoggerConfig) -> bool {
    if !config.enabled {
        return false;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(&config.level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.pretty_print {
        builder.with_ansi(true).pretty().try_init()
    } else {
        builder.with_ansi(false).compact().try_init()
    };

    installed.is_ok()
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::new(level)
}
