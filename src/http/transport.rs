//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Send one outbound request and hand back the streamed response
//! - Own every client-side policy decision (redirects, pooling, keep-alive, deadline)
//!
//! # Design Decisions
//! - `Transport` is the seam between the forwarder and the network so tests
//!   can observe or fake dispatch
//! - Request and response bodies are streamed, never buffered
//! - One attempt per call; no retries

use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;
use crate::http::error::DispatchError;

/// Sends a fully prepared outbound request.
pub trait Transport: Send + Sync + 'static {
    fn round_trip(
        &self,
        request: Request<Body>,
    ) -> BoxFuture<'static, Result<Response<Body>, DispatchError>>;
}

/// `reqwest`-backed transport with explicit client policy.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the client from config. `deadline` bounds each call end to end,
    /// response body included.
    pub fn new(config: &UpstreamConfig, deadline: Duration) -> Result<Self, reqwest::Error> {
        let redirect = match config.max_redirects {
            0 => Policy::none(),
            max => Policy::limited(max),
        };
        let keepalive = (config.tcp_keepalive_secs > 0)
            .then(|| Duration::from_secs(config.tcp_keepalive_secs));

        let client = reqwest::Client::builder()
            .redirect(redirect)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(deadline)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .tcp_keepalive(keepalive)
            .build()?;

        tracing::debug!(
            max_redirects = config.max_redirects,
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            deadline = ?deadline,
            "Upstream client ready"
        );

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn round_trip(
        &self,
        request: Request<Body>,
    ) -> BoxFuture<'static, Result<Response<Body>, DispatchError>> {
        let client = self.client.clone();

        Box::pin(async move {
            let (parts, body) = request.into_parts();

            let mut outbound = client
                .request(parts.method, parts.uri.to_string())
                .headers(parts.headers);
            if !body.is_end_stream() {
                outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
            }

            let upstream = outbound.send().await?;

            let status = upstream.status();
            let headers = upstream.headers().clone();
            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            Ok::<_, DispatchError>(response)
        })
    }
}
