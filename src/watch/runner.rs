//! The watch loop: filesystem events in, reload broadcasts out.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::config::ExtensionList;
use crate::lifecycle::ShutdownListener;
use crate::reload::{SubscriberRegistry, RELOAD_MESSAGE};
use crate::watch::event::{WatchEvent, WatchEventKind};
use crate::watch::watcher::{find_file, FileWatcher, WatchMessage};

/// Consumes watcher events until the source closes or shutdown fires.
pub struct WatchLoop {
    watcher: FileWatcher,
    events: mpsc::UnboundedReceiver<WatchMessage>,
    registry: Arc<SubscriberRegistry>,
    extensions: ExtensionList,
    debounce: Duration,
    pending: Option<Instant>,
}

impl WatchLoop {
    pub fn new(
        watcher: FileWatcher,
        events: mpsc::UnboundedReceiver<WatchMessage>,
        registry: Arc<SubscriberRegistry>,
        extensions: ExtensionList,
        debounce: Duration,
    ) -> Self {
        Self {
            watcher,
            events,
            registry,
            extensions,
            debounce,
            pending: None,
        }
    }

    /// Run until shutdown. The watcher is dropped on return, which releases
    /// its OS resources.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        tracing::debug!(extensions = %self.extensions, "Watch loop starting");

        loop {
            let deadline = self.pending;
            tokio::select! {
                _ = shutdown.wait() => {
                    tracing::debug!("Watch loop received shutdown signal, exiting");
                    break;
                }
                message = self.events.recv() => match message {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => tracing::warn!(error = %e, "Watcher error"),
                    None => {
                        tracing::debug!("Watcher event source closed");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.pending = None;
                    self.broadcast();
                }
            }
        }
    }

    fn handle_event(&mut self, event: WatchEvent) {
        match event.kind {
            WatchEventKind::Write if self.extensions.matches_path(&event.path) => {
                tracing::info!(path = %event.path.display(), "File changed");
                self.schedule_broadcast();
            }
            WatchEventKind::Create if self.watcher.should_watch_dir(&event.path) => {
                match self.watcher.watch_tree(&event.path) {
                    Ok(added) => tracing::debug!(
                        path = %event.path.display(),
                        added,
                        "Watching new directory"
                    ),
                    Err(e) => tracing::warn!(error = %e, "Failed to watch new directory"),
                }
                // Files written before the directory was registered raised no
                // events of their own; anything matching in a new directory is new.
                let extensions = &self.extensions;
                let found = find_file(&event.path, &|p: &Path| extensions.matches_path(p));
                if let Some(path) = found {
                    tracing::info!(path = %path.display(), "File changed");
                    self.schedule_broadcast();
                }
            }
            _ => tracing::trace!(path = %event.path.display(), kind = ?event.kind, "Ignoring event"),
        }
    }

    /// Broadcast now, or open a debounce window if none is pending.
    fn schedule_broadcast(&mut self) {
        if self.debounce.is_zero() {
            self.broadcast();
        } else if self.pending.is_none() {
            self.pending = Some(Instant::now() + self.debounce);
        }
    }

    fn broadcast(&self) {
        let report = self.registry.broadcast(RELOAD_MESSAGE);
        tracing::debug!(
            delivered = report.delivered,
            skipped = report.skipped,
            "Reload broadcast"
        );
    }
}
