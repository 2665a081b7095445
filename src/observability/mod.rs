//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (access lines, forwarding errors, lifecycle)
//!     → logging.rs (subscriber: filter + text or JSON formatter)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for production, plain text otherwise
//! - Components emit events only; the subscriber is chosen once at startup
//!   and can be scoped per test with `tracing::subscriber::set_default`

pub mod logging;
