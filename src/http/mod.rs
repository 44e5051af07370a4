//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → router.rs (classify: inject / reload / static)
//!         → intercept.rs → static_files.rs (ServeDir, listings) → rewrite HTML
//!         → reload::gateway (SSE stream)
//!         → static_files.rs
//!     → Send to client
//! ```

pub mod intercept;
pub mod listing;
pub mod request;
pub mod router;
pub mod server;
pub mod static_files;

pub use intercept::InterceptedResponse;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use router::Route;
pub use server::{AppState, HttpServer};
