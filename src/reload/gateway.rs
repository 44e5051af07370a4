//! Reload gateway: one server-sent-events stream per connected browser.
//!
//! # Protocol
//! ```text
//! Open      → register a Subscription, send headers
//! Streaming → payload on channel  → write `data: <payload>\n\n`, stay
//!           → client disconnects  → body dropped → Closing
//!           → shutdown closes     → stream ends  → Closing
//! Closing   → Subscription dropped, registry entry removed
//! ```
//!
//! There is no retry or keep-alive ping; a dropped stream simply ends.

use std::convert::Infallible;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, Stream};

use crate::lifecycle::ShutdownListener;
use crate::reload::registry::{SubscriberRegistry, Subscription};

/// Open a reload stream for one client.
pub fn reload_stream(registry: &Arc<SubscriberRegistry>, shutdown: ShutdownListener) -> Response {
    let subscription = registry.register();
    tracing::debug!(subscriber = %subscription.id(), "Reload stream opened");

    let mut response = Sse::new(events(subscription, shutdown)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}

/// Frames for one subscriber, ending on shutdown.
///
/// The subscription lives in the stream state, so dropping the stream (client
/// gone, write failure) or finishing it (shutdown) unregisters it.
fn events(
    subscription: Subscription,
    shutdown: ShutdownListener,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((subscription, shutdown), |(mut sub, mut shutdown)| async move {
        tokio::select! {
            payload = sub.recv() => {
                let payload = payload?;
                let event = Event::default().data(String::from_utf8_lossy(&payload));
                Some((Ok(event), (sub, shutdown)))
            }
            _ = shutdown.wait() => {
                tracing::debug!(subscriber = %sub.id(), "Reload stream closed by shutdown");
                None
            }
        }
    })
}
