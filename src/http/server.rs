//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the forwarding handler
//! - Wire up middleware (access log, body timeouts)
//! - Accept connections and hand them to hyper with header limits
//! - Drain connections on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::timeout::{RequestBodyTimeoutLayer, ResponseBodyTimeoutLayer};

use crate::config::{ProxyConfig, TimeoutConfig};
use crate::http::access_log::access_log;
use crate::http::forward::{forward, ForwardState};
use crate::http::transport::{ReqwestTransport, Transport};
use crate::net::{serve_connection, ConnectionSettings, ConnectionTracker, Listener, ListenerError};

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the production transport.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&config.upstream, config.timeouts.write())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server that dispatches through `transport`.
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        let router = build_router(ForwardState::new(transport), &config.timeouts);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let listener = Listener::new(listener, self.config.listener.max_connections);
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_connections = listener.max_connections(),
            "CORS proxy listening"
        );

        let settings = ConnectionSettings {
            header_read_timeout: self.config.timeouts.read(),
            max_header_bytes: self.config.listener.max_header_bytes,
        };
        let tracker = ConnectionTracker::new();
        let (drain_tx, drain_rx) = watch::channel(false);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        tokio::spawn(serve_connection(
                            stream,
                            peer,
                            self.router.clone(),
                            settings,
                            tracker.track(),
                            permit,
                            drain_rx.clone(),
                        ));
                    }
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        drop(listener);
        let _ = drain_tx.send(true);

        let grace = self.config.timeouts.shutdown_grace();
        if !tracker.wait_idle(grace).await {
            tracing::warn!(
                remaining = tracker.active_count(),
                grace = ?grace,
                "Connections still open after shutdown grace period"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// Every path is served by the forwarder, like a catch-all mux.
pub fn build_router(state: ForwardState, timeouts: &TimeoutConfig) -> Router {
    Router::new()
        .route("/", any(forward))
        .route("/{*path}", any(forward))
        .with_state(state)
        .layer(ResponseBodyTimeoutLayer::new(timeouts.write()))
        .layer(RequestBodyTimeoutLayer::new(timeouts.read()))
        .layer(middleware::from_fn(access_log))
}
