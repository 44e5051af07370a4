//! Filesystem watching subsystem.
//!
//! # Data Flow
//! ```text
//! OS change notification (inotify / FSEvents / ReadDirectoryChangesW)
//!     → watcher.rs (notify callback → WatchEvent → unbounded channel)
//!     → runner.rs (filter by watched extension, debounce)
//!     → SubscriberRegistry::broadcast("reload")
//! ```
//!
//! # Design Decisions
//! - Setup errors (watcher creation, walking the root) are fatal to startup
//! - Steady-state watcher errors are logged and the loop continues
//! - Hidden directories are never watched

pub mod event;
pub mod runner;
pub mod watcher;

pub use event::{WatchEvent, WatchEventKind};
pub use runner::WatchLoop;
pub use watcher::{FileWatcher, WatchError, WatchMessage};
