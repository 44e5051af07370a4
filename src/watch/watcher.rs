//! Filesystem watcher setup.
//!
//! # Responsibilities
//! - Create the platform watcher (fatal on failure)
//! - Walk the served tree and register every non-hidden directory
//! - Forward notify events into a Tokio channel as [`WatchEvent`]s
//!
//! # Design Decisions
//! - Directories are registered one by one (non-recursive) so hidden
//!   directories and everything under them are never watched
//! - The notify callback runs on the watcher's own thread; it only does an
//!   unbounded send and never blocks

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::watch::event::WatchEvent;

/// Item delivered by the watcher: an event or a runtime watcher error.
pub type WatchMessage = Result<WatchEvent, notify::Error>;

/// Error type for watcher setup.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create file watcher: {0}")]
    Create(#[source] notify::Error),

    #[error("failed to read directory {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to watch directory {}: {source}", .path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Returns true for names starting with a dot.
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// First file under `dir` (hidden directories excluded) that `matches`
/// accepts. Unreadable entries are skipped.
pub fn find_file(dir: &Path, matches: &dyn Fn(&Path) -> bool) -> Option<PathBuf> {
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            if is_hidden(&entry.file_name()) {
                continue;
            }
            if let Some(found) = find_file(&path, matches) {
                return Some(found);
            }
        } else if matches(&path) {
            return Some(path);
        }
    }
    None
}

/// Watches a directory tree, one directory at a time.
pub struct FileWatcher {
    inner: RecommendedWatcher,
    root: PathBuf,
    watched: usize,
}

impl FileWatcher {
    /// Create a watcher over `root` and register its directory tree.
    ///
    /// Returns the watcher and a receiver for change events. The root itself is
    /// always watched, whatever its name; hidden directories below it are not.
    pub fn new(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<WatchMessage>), WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let inner = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for event in WatchEvent::from_notify(event) {
                        let _ = tx.send(Ok(event));
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                }
            },
            Config::default(),
        )
        .map_err(WatchError::Create)?;

        let mut watcher = Self {
            inner,
            root: root.to_path_buf(),
            watched: 0,
        };
        watcher.watch_tree(root)?;

        tracing::info!(
            root = %root.display(),
            directories = watcher.watched,
            "File watcher started"
        );
        Ok((watcher, rx))
    }

    /// Register `dir` and every non-hidden directory below it.
    ///
    /// Returns the number of directories added.
    pub fn watch_tree(&mut self, dir: &Path) -> Result<usize, WatchError> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: dir.to_path_buf(),
                source,
            })?;
        self.watched += 1;
        let mut added = 1;

        let walk_err = |source| WatchError::Walk {
            path: dir.to_path_buf(),
            source,
        };
        for entry in fs::read_dir(dir).map_err(walk_err)? {
            let entry = entry.map_err(walk_err)?;
            let file_type = entry.file_type().map_err(walk_err)?;
            if file_type.is_dir() && !is_hidden(&entry.file_name()) {
                added += self.watch_tree(&entry.path())?;
            }
        }

        Ok(added)
    }

    /// Whether a newly created directory should join the watch set.
    pub fn should_watch_dir(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && path.is_dir()
            && path
                .strip_prefix(&self.root)
                .map(|rel| !rel.iter().any(is_hidden))
                .unwrap_or(false)
    }

    /// Number of directories registered so far.
    pub fn watched_count(&self) -> usize {
        self.watched
    }
}
