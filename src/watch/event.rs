//! Change notifications produced by the filesystem watcher.

use std::path::PathBuf;

use notify::event::ModifyKind;
use notify::EventKind;

/// Operation observed on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    /// File contents were written.
    Write,
    /// A file or directory appeared.
    Create,
    /// Anything else (metadata, removal, rename, access).
    Other,
}

impl From<&EventKind> for WatchEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => WatchEventKind::Write,
            EventKind::Create(_) => WatchEventKind::Create,
            _ => WatchEventKind::Other,
        }
    }
}

/// A single change to a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, kind: WatchEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one event per affected path.
    pub fn from_notify(event: notify::Event) -> Vec<WatchEvent> {
        let kind = WatchEventKind::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| WatchEvent { path, kind })
            .collect()
    }
}
