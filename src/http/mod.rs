//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, router, middleware)
//!     → access_log.rs (method/status/duration per request)
//!     → forward.rs (CORS, preflight, destination parsing)
//!     → headers.rs (hop-by-hop stripping, both directions)
//!     → transport.rs (outbound dispatch)
//!     → forward.rs (relay status, headers, streamed body)
//!     → Send to client
//! ```

pub mod access_log;
pub mod cors;
pub mod error;
pub mod forward;
pub mod headers;
pub mod server;
pub mod transport;

pub use error::{DispatchError, ProxyError};
pub use forward::ForwardState;
pub use server::HttpServer;
pub use transport::{ReqwestTransport, Transport};
