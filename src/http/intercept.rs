//! Response interception for reload script injection.
//!
//! # Responsibilities
//! - Run the static file handler unchanged
//! - Decide from status and headers alone whether the body may be rewritten
//! - Buffer and rewrite only successful HTML responses
//!
//! # Design Decisions
//! - The decision is made before the body is read: anything that is not a
//!   200 HTML answer to a GET is returned as the very response the static
//!   handler produced, streamed and unmodified
//! - Bodies larger than [`MAX_INJECT_BODY`] are passed through instead of
//!   being buffered
//! - Range and conditional request headers are dropped before a rewritable
//!   GET reaches the file handler, and the file's validators are dropped from
//!   the rewritten response: they describe the file on disk, not the page sent

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, response::Parts, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::server::AppState;
use crate::http::static_files;
use crate::reload::inject_script;

/// Largest body the interceptor buffers for rewriting.
pub const MAX_INJECT_BODY: usize = 32 * 1024 * 1024;

/// Headers describing the file on disk rather than the rewritten body.
const FILE_VALIDATORS: [header::HeaderName; 3] =
    [header::ACCEPT_RANGES, header::ETAG, header::LAST_MODIFIED];

/// Request headers that would let the file handler answer with a slice or a
/// 304 computed against the file on disk.
const PARTIAL_REQUEST_HEADERS: [header::HeaderName; 4] = [
    header::RANGE,
    header::IF_RANGE,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
];

/// A static response captured for rewriting.
#[derive(Debug)]
pub struct InterceptedResponse {
    parts: Parts,
    body: Bytes,
}

impl InterceptedResponse {
    /// Whether `response` is a successful HTML document small enough to buffer.
    pub fn is_injectable(response: &Response) -> bool {
        if response.status() != StatusCode::OK {
            return false;
        }
        let headers = response.headers();
        let is_html = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml+xml"))
            .unwrap_or(false);
        let fits = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .map_or(true, |len| len <= MAX_INJECT_BODY);
        is_html && fits
    }

    /// Buffer the whole body of `response`.
    pub async fn capture(response: Response) -> Result<Self, axum::Error> {
        let (parts, body) = response.into_parts();
        let body = to_bytes(body, MAX_INJECT_BODY).await?;
        Ok(Self { parts, body })
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Insert `script` and fix up the representation headers.
    pub fn inject(self, script: &[u8]) -> Response {
        let Self { mut parts, body } = self;
        let body = inject_script(&body, script);
        for name in FILE_VALIDATORS {
            parts.headers.remove(name);
        }
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        Response::from_parts(parts, Body::from(body))
    }
}

/// Serve a file, adding the reload script to successful HTML responses.
pub async fn serve_with_reload_script(state: &AppState, mut request: Request<Body>) -> Response {
    let rewrite = request.method() == Method::GET;
    if rewrite {
        let headers = request.headers_mut();
        for name in PARTIAL_REQUEST_HEADERS {
            headers.remove(name);
        }
    }
    let path = request.uri().path().to_owned();
    let response = static_files::serve(state, request).await;

    if !rewrite || !InterceptedResponse::is_injectable(&response) {
        return response;
    }

    match InterceptedResponse::capture(response).await {
        Ok(captured) => {
            tracing::debug!(path = %path, bytes = captured.body().len(), "Injecting reload script");
            captured.inject(state.script.as_bytes())
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Failed to buffer response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
