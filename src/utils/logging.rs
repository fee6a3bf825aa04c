//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry. `RUST_LOG` takes precedence
//! over the configured level.

use tracing::Span;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|e| ProtocolError::ConfigError(format!("Failed to initialize logging: {e}")))
}

/// Root span carrying `app_name` on every event logged inside it.
///
/// Opened at ERROR so the span is enabled under any level filter.
pub fn app_span(config: &LoggingConfig) -> Span {
    tracing::error_span!("app", app_name = %config.app_name)
}
