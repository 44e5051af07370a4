//! Subscriber registry for reload streams.
//!
//! # Responsibilities
//! - Hand out one dedicated channel per connected reload client
//! - Remove a client's channel when its stream ends
//! - Fan a payload out to every registered channel without blocking
//!
//! # Design Decisions
//! - A single mutex guards the whole set; it is held only for the insert,
//!   remove or iterate step and never across an await point
//! - Broadcast uses `try_send`: a subscriber whose one-slot buffer is full
//!   misses this round (at-most-once, best-effort)
//! - Deregistration is tied to `Drop` of the [`Subscription`], so every way a
//!   stream can end (client gone, shutdown, write failure) cleans up

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Buffered messages per subscriber. One slot mirrors a rendezvous hand-off:
/// a subscriber still busy with the previous frame skips the next broadcast.
const SUBSCRIBER_BUFFER: usize = 1;

/// Unique identifier of one reload-stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Result of one [`SubscriberRegistry::broadcast`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the payload.
    pub delivered: usize,
    /// Subscribers whose buffer was full or whose stream was already closing.
    pub skipped: usize,
}

/// Set of active reload subscribers.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    clients: Mutex<HashMap<SubscriberId, mpsc::Sender<Bytes>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh channel and add it to the set.
    pub fn register(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        let active = {
            let mut clients = self.clients();
            clients.insert(id, tx);
            clients.len()
        };
        tracing::debug!(subscriber = %id, active, "Reload subscriber registered");

        Subscription {
            id,
            rx,
            registry: Arc::clone(self),
        }
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let (removed, active) = {
            let mut clients = self.clients();
            let removed = clients.remove(&id).is_some();
            (removed, clients.len())
        };
        if removed {
            tracing::debug!(subscriber = %id, active, "Reload subscriber removed");
        }
        removed
    }

    /// Offer `payload` to every subscriber without waiting on any of them.
    pub fn broadcast(&self, payload: impl Into<Bytes>) -> BroadcastReport {
        let payload = payload.into();
        let mut report = BroadcastReport::default();

        let clients = self.clients();
        for (id, tx) in clients.iter() {
            match tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(subscriber = %id, "Subscriber not ready, skipping");
                    report.skipped += 1;
                }
                Err(TrySendError::Closed(_)) => report.skipped += 1,
            }
        }

        report
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.clients().contains_key(&id)
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.clients().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned guard is still usable.
    fn clients(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<Bytes>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One registered reload subscriber.
///
/// Dropping it removes the entry from the registry.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<Bytes>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next payload.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Take a payload if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}
