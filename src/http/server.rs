//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatch handler as fallback
//! - Wire up middleware (request ID, tracing)
//! - Accept connections on a bound listener until shutdown
//!
//! # Design Decisions
//! - The accept loop is owned here rather than delegated to `axum::serve`:
//!   every connection task lives in a [`JoinSet`] owned by [`HttpServer::run`],
//!   so cancelling that future drops every open socket with it

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::router::dispatch;
use crate::http::static_files::file_service;
use crate::lifecycle::ShutdownListener;
use crate::reload::{reload_script, SubscriberRegistry};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<SubscriberRegistry>,
    /// Handed to every reload stream so shutdown ends it.
    pub shutdown: ShutdownListener,
    pub files: ServeDir,
    /// Rendered reload client, injected into HTML pages.
    pub script: Arc<str>,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        registry: Arc<SubscriberRegistry>,
        shutdown: ShutdownListener,
    ) -> Self {
        let files = file_service(&config.root);
        Self {
            config,
            registry,
            shutdown,
            files,
            script: Arc::from(reload_script()),
        }
    }
}

/// HTTP server for the served directory.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Once `shutdown` fires the listener is closed, every open connection is
    /// told to finish its in-flight request, and this returns when the last
    /// one is gone. Dropping the returned future instead aborts all of them.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownListener) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let builder = Builder::new(TokioExecutor::new());
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::trace!(peer = %peer, "Connection accepted");
                        connections.spawn(serve_connection(
                            builder.clone(),
                            stream,
                            self.router.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => {
                        // Usually descriptor exhaustion; back off instead of spinning.
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        tracing::debug!(open = connections.len(), "Listener closed, draining connections");
        while connections.join_next().await.is_some() {}

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve one connection, switching it to graceful close when shutdown fires.
async fn serve_connection(
    builder: Builder<TokioExecutor>,
    stream: TcpStream,
    router: Router,
    mut shutdown: ShutdownListener,
) {
    let service = TowerToHyperService::new(router);
    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = shutdown.wait() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "Connection closed with error");
    }
}
