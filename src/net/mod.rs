//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (resolve host, bind)
//!     → TcpListener handed to the HTTP layer
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
