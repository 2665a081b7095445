//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limits)
//!     → connection.rs (hyper HTTP/1.1, header limits, lifecycle tracking)
//!     → Hand off to the axum router
//!
//! Connection States:
//!     Accepting → Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Plain TCP only; TLS termination is left to whatever sits in front

pub mod connection;
pub mod listener;

pub use connection::{serve_connection, ConnectionSettings, ConnectionTracker};
pub use listener::{Listener, ListenerError};
