//! Live reload subsystem.
//!
//! # Data Flow
//! ```text
//! watch loop ──broadcast("reload")──▶ registry.rs (lock-protected set of channels)
//!                                          │ try_send per subscriber
//!                                          ▼
//!                                    gateway.rs (one SSE stream per browser)
//!                                          │ data: reload\n\n
//!                                          ▼
//!                                    script.rs (injected client calls location.reload())
//! ```

pub mod gateway;
pub mod registry;
pub mod script;

pub use gateway::reload_stream;
pub use registry::{BroadcastReport, SubscriberId, SubscriberRegistry, Subscription};
pub use script::{inject_script, reload_script};

/// Reserved path of the reload event stream.
pub const RELOAD_PATH: &str = "/_hotreload";

/// Payload broadcast when a watched file changes.
pub const RELOAD_MESSAGE: &str = "reload";
