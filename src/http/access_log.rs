//! Access logging middleware: one line per request.
//!
//! The line is written when the response body is released, whether it ran
//! to completion, failed mid-stream, or was dropped by a departing client,
//! so `duration` covers body streaming.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use hyper::body::{Body as HttpBody, Frame, SizeHint};

/// Log method, status and total handling time for every request.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let line = AccessLine {
        method,
        status: parts.status,
        start,
    };
    Response::from_parts(parts, Body::new(LoggedBody { inner: body, _line: line }))
}

struct AccessLine {
    method: Method,
    status: StatusCode,
    start: Instant,
}

impl Drop for AccessLine {
    fn drop(&mut self) {
        tracing::info!(
            method = %self.method,
            status = self.status.as_u16(),
            duration = ?self.start.elapsed(),
            "access"
        );
    }
}

/// Response body that emits the access line when it goes away.
struct LoggedBody {
    inner: Body,
    _line: AccessLine,
}

impl HttpBody for LoggedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
