//! Request forwarding.
//!
//! # Responsibilities
//! - Answer CORS preflights locally
//! - Resolve the destination from the `url` query parameter
//! - Build the outbound request with sanitized headers and the inbound body
//! - Relay status, sanitized headers and the streamed body back to the caller
//!
//! # Design Decisions
//! - The response head is a finished value before any body byte is polled
//! - The outbound call lives inside the handler future, so dropping the
//!   inbound request (disconnect, timeout) cancels it
//! - Exactly one dispatch attempt

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use url::{form_urlencoded, Url};

use crate::http::cors::apply_cors_headers;
use crate::http::error::{DispatchCause, DispatchError, ProxyError};
use crate::http::headers::{copy_headers, remove_hop_by_hop_headers, HOP_BY_HOP_HEADERS};
use crate::http::transport::Transport;

/// Query parameter carrying the destination URL.
pub const URL_PARAM: &str = "url";

/// State shared by every forwarded request.
#[derive(Clone)]
pub struct ForwardState {
    pub transport: Arc<dyn Transport>,
}

impl ForwardState {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// Proxy handler: forwards the request to the `url` destination.
pub async fn forward(State(state): State<ForwardState>, request: Request<Body>) -> Response {
    let mut headers = HeaderMap::new();
    apply_cors_headers(&mut headers);

    if request.method() == Method::OPTIONS {
        return (StatusCode::OK, headers).into_response();
    }

    match dispatch(state.transport.as_ref(), request).await {
        Ok(upstream) => relay(upstream, headers),
        Err(err) => {
            match &err {
                ProxyError::Construction(e) => {
                    tracing::error!(error = %e, "Failed to build outbound request");
                }
                ProxyError::Dispatch(e) => {
                    tracing::error!(error = %e, cause = %e.cause(), "Upstream request failed");
                }
                ProxyError::InvalidUrl { reason } => {
                    tracing::debug!(reason = %reason, "Rejected destination url");
                }
                ProxyError::MissingUrl => {}
            }
            (headers, err).into_response()
        }
    }
}

/// Extract and parse the destination from the inbound request URI.
///
/// The first `url` parameter wins; an empty value counts as missing.
pub fn destination_url(uri: &Uri) -> Result<Url, ProxyError> {
    let raw = uri.query().and_then(|query| {
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == URL_PARAM)
            .map(|(_, value)| value.into_owned())
    });

    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ProxyError::MissingUrl),
    };

    Url::parse(&raw).map_err(|e| ProxyError::InvalidUrl {
        reason: e.to_string(),
    })
}

/// Reject schemes the transport cannot speak before the URL becomes an
/// `http::Uri`, which refuses host-less forms like `mailto:`.
fn ensure_dispatchable(destination: &Url) -> Result<(), DispatchError> {
    match destination.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DispatchError::new(
            DispatchCause::Request,
            format!("unsupported protocol scheme {scheme:?}"),
        )),
    }
}

async fn dispatch(
    transport: &dyn Transport,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let destination = destination_url(request.uri())?;
    ensure_dispatchable(&destination)?;
    let (parts, body) = request.into_parts();

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(destination.as_str())
        .body(body)?;

    copy_headers(&parts.headers, outbound.headers_mut());
    // Host belongs to this hop; the client derives it from the destination.
    outbound.headers_mut().remove(HOST);
    remove_hop_by_hop_headers(outbound.headers_mut(), &HOP_BY_HOP_HEADERS);

    tracing::debug!(
        method = %outbound.method(),
        destination = %destination,
        "Forwarding request"
    );

    Ok(transport.round_trip(outbound).await?)
}

/// Build the client response from the upstream one. `headers` already holds
/// the CORS headers.
fn relay(upstream: Response<Body>, mut headers: HeaderMap) -> Response {
    let (mut parts, body) = upstream.into_parts();

    remove_hop_by_hop_headers(&mut parts.headers, &HOP_BY_HOP_HEADERS);
    copy_headers(&parts.headers, &mut headers);

    // Status and headers are committed once this is returned, so a failing
    // body can only be logged.
    let body = Body::from_stream(body.into_data_stream().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to stream upstream body");
    }));

    let mut response = Response::new(body);
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers;
    response
}
