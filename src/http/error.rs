//! Forwarding errors and their client-facing responses.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a forwarded request did not produce an upstream response.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("'url' query param is missing")]
    MissingUrl,

    #[error("'url' query param is invalid")]
    InvalidUrl { reason: String },

    #[error("failed to build outbound request: {0}")]
    Construction(#[from] axum::http::Error),

    #[error("upstream dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Construction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain-text body sent to the caller. Internal errors leak nothing.
    pub fn body(&self) -> &'static str {
        match self {
            ProxyError::MissingUrl => "'url' query param is missing\n",
            ProxyError::InvalidUrl { .. } => "'url' query param is invalid\n",
            ProxyError::Construction(_) => "",
            // Every dispatch failure reads the same to the caller; the log
            // carries the real cause.
            ProxyError::Dispatch(_) => "no such host\n",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self.body() {
            "" => self.status().into_response(),
            body => (self.status(), body).into_response(),
        }
    }
}

/// Coarse classification of an outbound failure, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchCause {
    Connect,
    Timeout,
    Redirect,
    Request,
    Body,
    Other,
}

impl fmt::Display for DispatchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchCause::Connect => "connect",
            DispatchCause::Timeout => "timeout",
            DispatchCause::Redirect => "redirect",
            DispatchCause::Request => "request",
            DispatchCause::Body => "body",
            DispatchCause::Other => "other",
        };
        f.write_str(name)
    }
}

/// Failure reaching the destination.
#[derive(Debug, thiserror::Error)]
#[error("{cause}: {source}")]
pub struct DispatchError {
    cause: DispatchCause,
    #[source]
    source: BoxError,
}

impl DispatchError {
    pub fn new(cause: DispatchCause, source: impl Into<BoxError>) -> Self {
        Self {
            cause,
            source: source.into(),
        }
    }

    pub fn cause(&self) -> DispatchCause {
        self.cause
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        let cause = if e.is_timeout() {
            DispatchCause::Timeout
        } else if e.is_connect() {
            DispatchCause::Connect
        } else if e.is_redirect() {
            DispatchCause::Redirect
        } else if e.is_body() {
            DispatchCause::Body
        } else if e.is_request() || e.is_builder() {
            DispatchCause::Request
        } else {
            DispatchCause::Other
        };
        Self::new(cause, e)
    }
}
