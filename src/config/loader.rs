//! Configuration resolution.
//!
//! Turns a configuration assembled from command-line input into one the
//! server can run with: the root directory is made absolute and checked, then
//! the whole configuration is validated.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("directory {} does not exist", .0.display())]
    RootMissing(PathBuf),

    #[error("{} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("failed to get absolute path of {}: {source}", .path.display())]
    ResolveRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the root directory and validate the configuration.
///
/// An empty root means the current working directory.
pub fn resolve_config(mut config: ServerConfig) -> Result<ServerConfig, ConfigError> {
    let root = if config.root.as_os_str().is_empty() {
        std::env::current_dir().map_err(ConfigError::CurrentDir)?
    } else {
        config.root.clone()
    };

    config.root = resolve_root(&root)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn resolve_root(root: &Path) -> Result<PathBuf, ConfigError> {
    if !root.exists() {
        return Err(ConfigError::RootMissing(root.to_path_buf()));
    }

    let absolute = root.canonicalize().map_err(|source| ConfigError::ResolveRoot {
        path: root.to_path_buf(),
        source,
    })?;

    if !absolute.is_dir() {
        return Err(ConfigError::RootNotDirectory(absolute));
    }

    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ExtensionList;

    #[test]
    fn resolves_relative_root_to_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_config(ServerConfig::for_root(dir.path())).unwrap();
        assert!(config.root.is_absolute());
        assert_eq!(config.root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn empty_root_uses_current_dir() {
        let config = resolve_config(ServerConfig::default()).unwrap();
        assert_eq!(
            config.root,
            std::env::current_dir().unwrap().canonicalize().unwrap()
        );
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_config(ServerConfig::for_root(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::RootMissing(p) if p == missing));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();
        let err = resolve_config(ServerConfig::for_root(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::RootNotDirectory(_)));
    }

    #[test]
    fn validation_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::for_root(dir.path());
        config.reload.inject = ExtensionList::new([""]);
        let err = resolve_config(config).unwrap_err();
        assert!(err.to_string().contains("inject extension list contains an empty entry"));
    }
}
