//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve and validate configuration
//! - Create the file watcher and bind the listener
//! - Spawn the HTTP server and the watch loop
//! - Stop both on request, with a bounded grace period
//!
//! # Design Decisions
//! - Fail fast: every startup-fatal step runs before any task is spawned
//! - Shutdown closes one signal; reload streams, the watch loop and the
//!   HTTP server all observe it
//! - Grace period elapsed → the server task is aborted, which drops every
//!   open connection with it (forced), not an error

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::{resolve_config, ServerConfig};
use crate::error::ServerError;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::{ShutdownOutcome, ShutdownSignal};
use crate::net;
use crate::reload::SubscriberRegistry;
use crate::watch::{FileWatcher, WatchLoop};

/// A started server: HTTP listener plus watch loop.
pub struct RunningServer {
    config: Arc<ServerConfig>,
    local_addr: SocketAddr,
    registry: Arc<SubscriberRegistry>,
    shutdown: ShutdownSignal,
    server_task: JoinHandle<io::Result<()>>,
    watch_task: JoinHandle<()>,
}

/// Start serving `config.root`.
///
/// Returns once the listener is bound and the watcher is registered; the
/// server keeps running in background tasks until [`RunningServer::shutdown`].
pub async fn start(config: ServerConfig) -> Result<RunningServer, ServerError> {
    let config = Arc::new(resolve_config(config)?);

    tracing::info!(
        root = %config.root.display(),
        watch = %config.reload.watch,
        inject = %config.reload.inject,
        "Configuration loaded"
    );

    let (watcher, events) = FileWatcher::new(&config.root)?;
    let (listener, local_addr) = net::bind(&config.listener).await?;

    let shutdown = ShutdownSignal::new();
    let registry = Arc::new(SubscriberRegistry::new());

    let watch_loop = WatchLoop::new(
        watcher,
        events,
        Arc::clone(&registry),
        config.reload.watch.clone(),
        config.reload.debounce(),
    );
    let watch_task = tokio::spawn(watch_loop.run(shutdown.subscribe()));

    let state = AppState::new(Arc::clone(&config), Arc::clone(&registry), shutdown.subscribe());
    let server = HttpServer::new(state);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tracing::info!(
        "Serving {} on http://{}",
        config.root.display(),
        config.listener.display_address()
    );

    Ok(RunningServer {
        config,
        local_addr,
        registry,
        shutdown,
        server_task,
        watch_task,
    })
}

impl RunningServer {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The live subscriber set.
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Wait for `stop`, then shut down.
    pub async fn run_until<F>(self, stop: F) -> ShutdownOutcome
    where
        F: Future<Output = ()>,
    {
        stop.await;
        self.shutdown().await
    }

    /// Close the shutdown signal and wait up to the grace period for the
    /// HTTP server to drain.
    pub async fn shutdown(self) -> ShutdownOutcome {
        let grace = self.config.shutdown.grace_period();
        tracing::info!(grace_secs = grace.as_secs(), "Shutting down");

        self.shutdown.trigger();

        let outcome = drain(self.server_task, grace).await;

        // The watch loop only waits on the signal and its channel, so it ends
        // promptly; a short bound keeps a wedged watcher from stalling exit.
        if tokio::time::timeout(Duration::from_secs(1), self.watch_task)
            .await
            .is_err()
        {
            tracing::warn!("Watch loop did not stop in time");
        }

        match outcome {
            ShutdownOutcome::Graceful => tracing::info!("Shutdown complete"),
            ShutdownOutcome::Forced { grace } => tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, open connections were closed"
            ),
        }
        outcome
    }
}

async fn drain(mut server_task: JoinHandle<io::Result<()>>, grace: Duration) -> ShutdownOutcome {
    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(Ok(Ok(()))) => ShutdownOutcome::Graceful,
        Ok(Ok(Err(e))) => {
            tracing::error!(error = %e, "HTTP server exited with error");
            ShutdownOutcome::Graceful
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "HTTP server task failed");
            ShutdownOutcome::Graceful
        }
        Err(_) => {
            server_task.abort();
            // Wait for the cancellation so its connection set has been dropped.
            let _ = server_task.await;
            ShutdownOutcome::Forced { grace }
        }
    }
}
