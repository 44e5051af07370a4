//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use live_httpd::config::{BindHost, ServerConfig};
use live_httpd::RunningServer;
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<html><body>Hi</body></html>";

/// A temporary site with an `index.html`, a stylesheet and a hidden directory.
pub fn create_site() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    std::fs::write(root.join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(root.join("style.css"), "body { margin: 0; }").unwrap();
    std::fs::create_dir(root.join(".git")).unwrap();
    std::fs::write(root.join(".git/notes.html"), "<p>hidden</p>").unwrap();
    (dir, root)
}

/// Configuration bound to an ephemeral loopback port.
pub fn test_config(root: &Path) -> ServerConfig {
    let mut config = ServerConfig::for_root(root);
    config.listener.host = BindHost::parse("127.0.0.1");
    config.listener.port = 0;
    config
}

pub async fn start_server(root: &Path) -> RunningServer {
    live_httpd::start(test_config(root)).await.unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn url(server: &RunningServer, path: &str) -> String {
    format!("http://{}{}", server.local_addr(), path)
}

/// Outcome of waiting for the next event-stream frame.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameRead {
    Frame(String),
    Eof,
    Timeout,
}

/// Splits an SSE response body into `\n\n`-terminated frames.
pub struct SseReader {
    stream: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buf: Vec<u8>,
}

impl SseReader {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            stream: Box::pin(response.bytes_stream()),
            buf: Vec::new(),
        }
    }

    pub async fn next_frame(&mut self, wait: Duration) -> FrameRead {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if let Some(end) = self.buf.windows(2).position(|w| w == b"\n\n") {
                let frame: Vec<u8> = self.buf.drain(..end + 2).collect();
                return FrameRead::Frame(String::from_utf8(frame).unwrap());
            }
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Ok(Some(Ok(chunk))) => self.buf.extend_from_slice(&chunk),
                Ok(Some(Err(_))) | Ok(None) => return FrameRead::Eof,
                Err(_) => return FrameRead::Timeout,
            }
        }
    }
}

/// Open a reload stream and wait until the server has registered it.
pub async fn connect_reload(server: &RunningServer) -> SseReader {
    let before = server.registry().len();
    let response = client()
        .get(url(server, live_httpd::RELOAD_PATH))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["cache-control"], "no-cache");
    assert!(server.registry().len() > before);
    SseReader::new(response)
}
