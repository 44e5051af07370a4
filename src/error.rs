//! Startup-fatal errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::ListenerError;
use crate::watch::WatchError;

/// Anything that stops the server from starting.
///
/// Errors after startup (watcher runtime errors, failed writes to a single
/// reload stream) are logged where they happen and never become a `ServerError`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}
