//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line arguments
//!     → schema.rs (ServerConfig with defaults)
//!     → loader.rs (resolve root directory to an absolute path)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; nothing reloads it at runtime
//! - All fields have defaults matching the command-line defaults
//! - Validation separates parsing (clap) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError};
pub use schema::{BindHost, ExtensionList, ListenerConfig, ReloadConfig, ServerConfig, ShutdownConfig};
pub use validation::ValidationError;
