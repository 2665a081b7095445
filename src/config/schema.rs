//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive `Deserialize` so they can be read from config files.

use std::time::Duration;

use serde::Deserialize;

/// Root configuration for the CORS proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Inbound connection timeouts.
    pub timeouts: TimeoutConfig,

    /// Outbound client behaviour.
    pub upstream: UpstreamConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Upper bound on the request head (request line + headers), in bytes.
    pub max_header_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 10_000,
            max_header_bytes: 1 << 20,
        }
    }
}

/// Timeout configuration for inbound connections.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to read the request head, and between request body frames.
    pub read_secs: u64,

    /// Time allowed between response body frames. Also the deadline of the
    /// outbound call, which includes streaming the response body.
    pub write_secs: u64,

    /// How long shutdown waits for in-flight connections to finish.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 10,
            write_secs: 10,
            shutdown_grace_secs: 10,
        }
    }
}

/// Outbound HTTP client configuration.
///
/// Everything the platform client would otherwise decide silently is spelled
/// out here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// TCP connect (and TLS handshake) timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Redirects followed before the redirect response itself is returned.
    /// `0` hands every 3xx straight back to the caller.
    pub max_redirects: usize,

    /// Idle pooled connections kept per destination host.
    pub pool_max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// TCP keep-alive interval in seconds; `0` disables it.
    pub tcp_keepalive_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            max_redirects: 10,
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            tcp_keepalive_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line, with source locations.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,

    /// Default filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            log_filter: "cors_proxy=debug,info".to_string(),
        }
    }
}
