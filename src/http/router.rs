//! Per-request dispatch.
//!
//! Requests are classified in a fixed priority order:
//! 1. path ends with an inject-eligible extension → interception + injection
//! 2. path is the reload endpoint → reload event stream
//! 3. anything else → plain static file serving

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;

use crate::http::server::AppState;
use crate::http::{intercept, static_files};
use crate::reload::{reload_stream, RELOAD_PATH};

/// How a request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Inject,
    Reload,
    Static,
}

impl Route {
    pub fn classify(state: &AppState, path: &str) -> Self {
        if state.config.reload.inject.matches(path) {
            Route::Inject
        } else if path == RELOAD_PATH {
            Route::Reload
        } else {
            Route::Static
        }
    }
}

/// Fallback handler for every request.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let route = Route::classify(&state, request.uri().path());
    tracing::trace!(route = ?route, "Dispatching request");

    match route {
        Route::Inject => intercept::serve_with_reload_script(&state, request).await,
        Route::Reload => reload_stream(&state.registry, state.shutdown.clone()),
        Route::Static => static_files::serve(&state, request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtensionList, ServerConfig};
    use crate::http::server::HttpServer;
    use crate::lifecycle::ShutdownSignal;
    use crate::reload::SubscriberRegistry;
    use axum::body::to_bytes;
    use axum::http::{header, Method, StatusCode};
    use axum::Router;
    use std::fs;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Fixture {
        state: AppState,
        _shutdown: ShutdownSignal,
        _dir: tempfile::TempDir,
    }

    fn fixture(inject: ExtensionList) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("index.html"), "<html><body>Hi</body></html>").unwrap();
        fs::write(root.join("style.css"), "body { color: red; }").unwrap();
        fs::write(root.join("page.html"), "<p>no body tag</p>").unwrap();
        fs::create_dir(root.join("assets")).unwrap();
        fs::write(root.join("assets/app.js"), "console.log(1);").unwrap();

        let mut config = ServerConfig::for_root(&root);
        config.reload.inject = inject;
        let shutdown = ShutdownSignal::new();
        let state = AppState::new(
            Arc::new(config),
            Arc::new(SubscriberRegistry::new()),
            shutdown.subscribe(),
        );
        Fixture {
            state,
            _shutdown: shutdown,
            _dir: dir,
        }
    }

    fn app(fixture: &Fixture) -> Router {
        HttpServer::build_router(fixture.state.clone())
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[test]
    fn classify_follows_priority_order() {
        let f = fixture(ExtensionList::default());
        assert_eq!(Route::classify(&f.state, "/index.html"), Route::Inject);
        assert_eq!(Route::classify(&f.state, "/_hotreload"), Route::Reload);
        assert_eq!(Route::classify(&f.state, "/style.css"), Route::Static);
        assert_eq!(Route::classify(&f.state, "/"), Route::Static);

        // An inject suffix that also matches the reload path wins.
        let f = fixture(ExtensionList::new(["reload"]));
        assert_eq!(Route::classify(&f.state, "/_hotreload"), Route::Inject);
    }

    #[tokio::test]
    async fn html_gets_script_before_closing_body() {
        let f = fixture(ExtensionList::default());
        let (status, headers, body) = send(app(&f), Method::GET, "/index.html").await;
        assert_eq!(status, StatusCode::OK);

        let expected = [
            &b"<html><body>Hi"[..],
            f.state.script.as_bytes(),
            &b"</body></html>"[..],
        ]
        .concat();
        assert_eq!(body, expected);
        assert_eq!(
            headers[header::CONTENT_LENGTH],
            body.len().to_string().as_str()
        );
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn range_request_for_html_gets_full_rewritten_page() {
        let f = fixture(ExtensionList::default());
        let request = Request::builder()
            .uri("/index.html")
            .header(header::RANGE, "bytes=0-5")
            .header(header::IF_RANGE, "\"stale\"")
            .body(Body::empty())
            .unwrap();
        let response = app(&f).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::ACCEPT_RANGES));
        assert!(!response.headers().contains_key(header::ETAG));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("EventSource"));
        assert!(body.ends_with(b"</body></html>"));
    }

    #[tokio::test]
    async fn range_request_for_other_files_is_honored() {
        let f = fixture(ExtensionList::default());
        let request = Request::builder()
            .uri("/style.css")
            .header(header::RANGE, "bytes=0-3")
            .body(Body::empty())
            .unwrap();
        let response = app(&f).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"body");
    }

    #[tokio::test]
    async fn html_without_body_tag_gets_script_appended() {
        let f = fixture(ExtensionList::default());
        let (status, _, body) = send(app(&f), Method::GET, "/page.html").await;
        assert_eq!(status, StatusCode::OK);
        let expected = [&b"<p>no body tag</p>"[..], f.state.script.as_bytes()].concat();
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn non_html_is_never_rewritten() {
        // `.css` configured for injection, but the content type is not HTML.
        let f = fixture(ExtensionList::new([".html", ".css"]));
        let (status, headers, body) = send(app(&f), Method::GET, "/style.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"body { color: red; }");
        assert_eq!(headers[header::CONTENT_LENGTH], "20");
    }

    #[tokio::test]
    async fn missing_html_passes_through_as_404() {
        let f = fixture(ExtensionList::default());
        let (status, _, body) = send(app(&f), Method::GET, "/missing.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!String::from_utf8_lossy(&body).contains("EventSource"));
    }

    #[tokio::test]
    async fn head_request_is_not_rewritten() {
        let f = fixture(ExtensionList::default());
        let (status, headers, body) = send(app(&f), Method::HEAD, "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(headers[header::CONTENT_LENGTH], "28");
    }

    #[tokio::test]
    async fn plain_static_files_are_served() {
        let f = fixture(ExtensionList::default());
        let (status, _, body) = send(app(&f), Method::GET, "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log(1);");

        let (status, _, body) = send(app(&f), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html><body>Hi</body></html>");
    }

    #[tokio::test]
    async fn directory_without_index_is_listed() {
        let f = fixture(ExtensionList::default());
        let (status, headers, body) = send(app(&f), Method::GET, "/assets/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert!(String::from_utf8_lossy(&body).contains("<a href=\"app.js\">app.js</a>"));
    }

    #[tokio::test]
    async fn reload_path_opens_event_stream() {
        let f = fixture(ExtensionList::default());
        let request = Request::builder()
            .uri(RELOAD_PATH)
            .body(Body::empty())
            .unwrap();
        let response = app(&f).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(f.state.registry.len(), 1);

        drop(response);
        assert!(f.state.registry.is_empty());
    }
}
