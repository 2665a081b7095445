//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - JSON format (with source locations) for production, plain format for development
//! - `RUST_LOG` overrides the configured filter

use tracing::Subscriber;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Build the subscriber described by `config` without installing it.
pub fn subscriber(config: &ObservabilityConfig) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_file(true)
                    .with_line_number(true),
            ),
        ),
        LogFormat::Text => Box::new(registry.with(fmt::layer())),
    }
}

/// Install the configured subscriber as the global default.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    subscriber(config).try_init()
}
