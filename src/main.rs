use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use live_httpd::config::{BindHost, ExtensionList, ServerConfig};
use live_httpd::lifecycle::{self, ShutdownOutcome};
use live_httpd::observability::logging;

/// Serve a directory over HTTP and reload browsers when files change.
#[derive(Parser, Debug)]
#[command(name = "live-httpd", version, about, long_about = None)]
struct Cli {
    /// Directory to serve (defaults to the current directory)
    dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8090)]
    port: u16,

    /// IP address to bind (`*` for all interfaces)
    #[arg(short, long, default_value = "*")]
    ip: String,

    /// File extensions to watch for hot reload (e.g. .html,.js,.css)
    #[arg(short, long, value_delimiter = ',', default_value = ".html")]
    watch: Vec<String>,

    /// File extensions to inject the hot reload script into (e.g. .html,.php)
    #[arg(short = 'j', long, value_delimiter = ',', default_value = ".html")]
    inject: Vec<String>,

    /// Seconds in-flight requests get to finish on shutdown
    #[arg(long, default_value_t = 5)]
    grace_secs: u64,

    /// Window for coalescing bursts of file writes, in milliseconds (0 disables)
    #[arg(long, default_value_t = 100)]
    debounce_ms: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::for_root(self.dir.unwrap_or_default());
        config.listener.host = BindHost::parse(&self.ip);
        config.listener.port = self.port;
        config.reload.watch = ExtensionList::new(self.watch);
        config.reload.inject = ExtensionList::new(self.inject);
        config.reload.debounce_ms = self.debounce_ms;
        config.shutdown.grace_secs = self.grace_secs;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    tracing::info!("live-httpd v{} starting", env!("CARGO_PKG_VERSION"));

    let server = match lifecycle::start(cli.into_config()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(address = %server.local_addr(), "Press Ctrl+C to stop");

    match server.run_until(lifecycle::wait_for_stop_signal()).await {
        ShutdownOutcome::Graceful => {}
        ShutdownOutcome::Forced { .. } => {
            tracing::warn!("Server was force-closed after the grace period");
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = Cli::parse_from(["live-httpd"]).into_config();
        assert_eq!(config.listener.port, 8090);
        assert_eq!(config.listener.host, BindHost::Any);
        assert!(config.root.as_os_str().is_empty());
        assert_eq!(config.reload.watch, ExtensionList::new([".html"]));
        assert_eq!(config.reload.inject, ExtensionList::new([".html"]));
    }

    #[test]
    fn extension_lists_accept_commas_and_repeats() {
        let config = Cli::parse_from([
            "live-httpd",
            "site",
            "-p",
            "3000",
            "-i",
            "127.0.0.1",
            "-w",
            ".html,.css",
            "--watch",
            ".js",
            "-j",
            ".php",
        ])
        .into_config();

        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.listener.host, BindHost::Named("127.0.0.1".into()));
        assert_eq!(config.reload.watch, ExtensionList::new([".html", ".css", ".js"]));
        assert_eq!(config.reload.inject, ExtensionList::new([".php"]));
    }
}
