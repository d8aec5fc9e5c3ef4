//! Durable key-value cells under the data directory.
//!
//! Each key maps to one file. Storage failures are swallowed and logged:
//! callers treat persistence as best-effort, and the affected feature
//! degrades to in-memory-only rather than crashing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Well-known storage keys.
pub mod keys {
    /// Access token.
    pub const ACCESS: &str = "access";

    /// Refresh token.
    pub const REFRESH: &str = "refresh";

    /// Cached user object, JSON-serialized.
    pub const USER: &str = "user.json";

    /// Cart line items, JSON-serialized.
    pub const CART: &str = "cart.json";

    /// Selected display currency.
    pub const CURRENCY: &str = "currency";
}

/// A directory of single-value cells, one file per key.
///
/// The durable counterpart of the original web client's local storage:
/// single-writer-per-process, multi-reader, last-writer-wins.
#[derive(Debug, Clone)]
pub struct StorageDir {
    dir: PathBuf,
}

impl StorageDir {
    /// Use `dir` as the backing directory. The directory is created lazily
    /// on the first write.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Absolute path of the file backing `key`.
    #[must_use]
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// The backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the value stored under `key`, or `None` when absent or
    /// unreadable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read storage cell");
                None
            }
        }
    }

    /// Write `value` under `key`, best-effort.
    pub fn put(&self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "Failed to create storage directory");
            return;
        }
        if let Err(e) = std::fs::write(self.path(key), value) {
            warn!(key, error = %e, "Failed to write storage cell");
        } else {
            debug!(key, "Wrote storage cell");
        }
    }

    /// Remove the value stored under `key`, best-effort.
    pub fn remove(&self, key: &str) {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => debug!(key, "Removed storage cell"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "Failed to remove storage cell"),
        }
    }
}
