//! CORS forwarding proxy library.
//!
//! Relays a request to the destination named by its `url` query parameter and
//! streams the answer back with permissive cross-origin headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
