//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of values the type system cannot rule out
//! - Reject empty extension lists and empty suffixes
//! - Validate value ranges (grace period > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{ExtensionList, ServerConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{list} extension list is empty")]
    EmptyExtensionList { list: &'static str },

    #[error("{list} extension list contains an empty entry")]
    EmptyExtension { list: &'static str },

    #[error("shutdown grace period must be greater than zero")]
    ZeroGracePeriod,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_extensions("watch", &config.reload.watch, &mut errors);
    check_extensions("inject", &config.reload.inject, &mut errors);

    if config.shutdown.grace_secs == 0 {
        errors.push(ValidationError::ZeroGracePeriod);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_extensions(list: &'static str, exts: &ExtensionList, errors: &mut Vec<ValidationError>) {
    if exts.is_empty() {
        errors.push(ValidationError::EmptyExtensionList { list });
    }
    // An empty suffix would match every path.
    if exts.iter().any(|ext| ext.trim().is_empty()) {
        errors.push(ValidationError::EmptyExtension { list });
    }
}
