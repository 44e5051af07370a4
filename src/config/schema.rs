//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! Every section has defaults matching the command-line defaults, so tests and
//! embedders can start from `ServerConfig::default()` and override fields.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for the development server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Directory served and watched. Absolute once resolved by the loader.
    pub root: PathBuf,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Live reload settings (watched and inject-eligible extensions).
    pub reload: ReloadConfig,

    /// Shutdown settings.
    pub shutdown: ShutdownConfig,
}

impl ServerConfig {
    /// Build a configuration serving `root` with default settings.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Host part of the listen address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BindHost {
    /// `*`: listen on every interface.
    #[default]
    Any,
    /// A specific IP literal or resolvable host name.
    Named(String),
}

impl BindHost {
    /// Parse the command-line form, where `*` (or an empty string) means all interfaces.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "*" => BindHost::Any,
            host => BindHost::Named(host.to_string()),
        }
    }

    /// Host string handed to the socket layer.
    pub fn as_socket_host(&self) -> &str {
        match self {
            BindHost::Any => "0.0.0.0",
            BindHost::Named(host) => host.trim_start_matches('[').trim_end_matches(']'),
        }
    }
}

impl fmt::Display for BindHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindHost::Any => f.write_str("*"),
            BindHost::Named(host) => f.write_str(host),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind host (`*` for all interfaces).
    pub host: BindHost,

    /// Bind port. Port 0 asks the OS for an ephemeral port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: BindHost::Any,
            port: 8090,
        }
    }
}

impl ListenerConfig {
    /// Human-readable `host:port` form used in logs.
    pub fn display_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ordered list of case-sensitive file suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionList(Vec<String>);

impl ExtensionList {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(extensions.into_iter().map(Into::into).collect())
    }

    /// Returns true if any configured suffix ends `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().any(|ext| text.ends_with(ext.as_str()))
    }

    /// Same as [`matches`](Self::matches) for a filesystem path.
    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&path.to_string_lossy())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionList {
    fn default() -> Self {
        Self::new([".html"])
    }
}

impl fmt::Display for ExtensionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Live reload configuration.
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// Suffixes whose writes trigger a reload broadcast.
    pub watch: ExtensionList,

    /// Suffixes whose successful HTML responses get the reload script.
    pub inject: ExtensionList,

    /// Window in milliseconds for coalescing bursts of writes (0 = broadcast every write).
    pub debounce_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch: ExtensionList::default(),
            inject: ExtensionList::default(),
            debounce_ms: 100,
        }
    }
}

impl ReloadConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Time in-flight requests get to finish before the listener is force-closed.
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_secs: 5 }
    }
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_list_matches_suffix() {
        let exts = ExtensionList::new([".html", ".css"]);
        assert!(exts.matches("/index.html"));
        assert!(exts.matches("/site/main.css"));
        assert!(!exts.matches("/app.js"));
        assert!(!exts.matches("/INDEX.HTML"));
    }

    #[test]
    fn extension_list_matches_path() {
        let exts = ExtensionList::default();
        assert!(exts.matches_path(Path::new("/tmp/site/page.html")));
        assert!(!exts.matches_path(Path::new("/tmp/site/page.htm")));
    }

    #[test]
    fn bind_host_parsing() {
        assert_eq!(BindHost::parse("*"), BindHost::Any);
        assert_eq!(BindHost::parse(""), BindHost::Any);
        assert_eq!(
            BindHost::parse("127.0.0.1"),
            BindHost::Named("127.0.0.1".into())
        );
        assert_eq!(BindHost::Any.as_socket_host(), "0.0.0.0");
        assert_eq!(BindHost::parse("[::1]").as_socket_host(), "::1");
    }

    #[test]
    fn defaults_match_cli() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.port, 8090);
        assert_eq!(config.listener.host, BindHost::Any);
        assert_eq!(config.reload.watch.to_string(), ".html");
        assert_eq!(config.reload.inject.to_string(), ".html");
        assert_eq!(config.shutdown.grace_period(), Duration::from_secs(5));
        assert_eq!(config.listener.display_address(), "*:8090");
    }
}
