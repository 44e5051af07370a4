//! Shutdown coordination for the server.

use std::time::Duration;

use tokio::sync::watch;

/// Process-wide shutdown signal.
///
/// Closed at most once and never reset. Every long-running task holds a
/// [`ShutdownListener`]; closing the signal wakes all of them at once, and a
/// listener created after the close still observes it.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// Create a new, open shutdown signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Close the signal. Later calls are no-ops.
    pub fn trigger(&self) {
        let already = self.tx.send_replace(true);
        if !already {
            tracing::debug!(listeners = self.tx.receiver_count(), "Shutdown signal closed");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`ShutdownSignal`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once the signal is closed.
    ///
    /// Also resolves if every [`ShutdownSignal`] handle was dropped, since
    /// nothing could close it any more.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|closed| *closed).await;
    }

    /// Owned variant of [`wait`](Self::wait) for APIs that need a `'static` future.
    pub async fn closed(mut self) {
        self.wait().await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// How the listener stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished within the grace period.
    Graceful,
    /// The grace period elapsed and remaining connections were dropped.
    Forced { grace: Duration },
}

impl ShutdownOutcome {
    pub fn is_graceful(&self) -> bool {
        matches!(self, ShutdownOutcome::Graceful)
    }
}
