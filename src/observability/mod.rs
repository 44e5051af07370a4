//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → request spans with request IDs (http::server)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout, filtered by RUST_LOG)
//! ```

pub mod logging;
