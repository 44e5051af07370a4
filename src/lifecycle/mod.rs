//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Create watcher → Bind listener → Spawn server + watch loop
//!
//! Shutdown (shutdown.rs):
//!     Signal closed → Reload streams end, watch loop exits
//!                   → HTTP server drains → forced close after grace period
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then watcher, then listener
//! - One closeable signal is the only shutdown primitive
//! - Shutdown has timeout: forced close after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{ShutdownListener, ShutdownOutcome, ShutdownSignal};
pub use signals::wait_for_stop_signal;
pub use startup::{start, RunningServer};
