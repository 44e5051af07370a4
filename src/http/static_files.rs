//! Static file serving from the root directory.
//!
//! `ServeDir` handles index resolution, trailing-slash redirects, MIME types,
//! conditional and range requests. A 404 for a directory without an
//! `index.html` is replaced by a listing.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::listing;
use crate::http::server::AppState;

/// Build the file service for `root`.
pub fn file_service(root: &std::path::Path) -> ServeDir {
    ServeDir::new(root).append_index_html_on_directories(true)
}

/// Serve `request` from the root directory.
pub async fn serve(state: &AppState, request: Request<Body>) -> Response {
    let path = request.uri().path().to_owned();

    let response = match state.files.clone().oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        if let Some(dir) = listing::resolve_dir(&state.config.root, &path) {
            if let Some(listing) = listing::render(&dir).await {
                return listing;
            }
        }
    }

    response
}
