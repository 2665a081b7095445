//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration (file, environment, command line, in that order)
//! - Validate the merged result before anything binds
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::Path;

use crate::config::validation::validate_config;
use crate::config::{apply_env_overrides, load_config, ConfigError, ProxyConfig};

/// Build the effective configuration.
///
/// `listen` overrides the bind address from the file.
pub fn resolve_config(path: Option<&Path>, listen: Option<String>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(listen) = listen {
        config.listener.bind_address = listen;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
