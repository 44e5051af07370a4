//! Local development HTTP server with live reload.
//!
//! Serves a directory tree, watches it for writes, and pushes `reload`
//! events over server-sent events to every connected browser. HTML pages
//! served with an inject-eligible extension get a small script that
//! subscribes to the event stream and reloads the page.
//!
//! # Architecture Overview
//!
//! ```text
//!   file write ──▶ watch ──▶ reload::registry ──▶ reload::gateway ──▶ browser
//!                                                      ▲
//!   request ──▶ http::router ──┬── inject ──▶ http::intercept ──▶ static files
//!                              ├── /_hotreload ───────┘
//!                              └── static ──▶ static files
//!
//!   lifecycle: start → (server task, watch task) → shutdown signal → drain
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod reload;
pub mod watch;

pub use config::ServerConfig;
pub use error::ServerError;
pub use http::HttpServer;
pub use lifecycle::{start, RunningServer, ShutdownOutcome, ShutdownSignal};
pub use reload::{SubscriberRegistry, RELOAD_PATH};
