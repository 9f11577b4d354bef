//! The Cursor Store: a process-wide persistent mapping from stream key to
//! an opaque cursor string.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use etl_common::{Error, Result};
use parking_lot::RwLock;

/// Durable key-value map persisting the last-seen `modified` cursor for
/// each tracked stream.
pub trait CursorStore: Send + Sync {
    /// Look up the cursor for `key`, or `None` if it has never been set.
    fn get(&self, key: &str) -> Option<String>;

    /// Atomically persist `value` as the cursor for `key`. Must not return
    /// until the write is durable: a crash immediately after `set` returns
    /// must never lose the value.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// The full key-to-cursor map, as loaded at startup.
    fn snapshot(&self) -> HashMap<String, String>;
}

/// A [`CursorStore`] backed by a single JSON document on disk.
///
/// Writes go through a temp-file-then-rename so a crash mid-write never
/// leaves a partially-written cursor file behind.
pub struct JsonFileCursorStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl JsonFileCursorStore {
    /// Load the cursor file at `path`, or start with an empty map if it
    /// does not exist. An existing-but-unreadable file is a fatal error —
    /// the store refuses to guess at lost state.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let cache = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::cursor_store(format!(
                    "cursor file {:?} is not valid JSON: {e}",
                    path
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(Error::cursor_store(format!(
                    "failed to read cursor file {:?}: {e}",
                    path
                )))
            }
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    fn write_through(&self, cache: &HashMap<String, String>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        std::fs::create_dir_all(dir)
            .map_err(|e| Error::cursor_store(format!("failed to create {:?}: {e}", dir)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::cursor_store(format!("failed to create temp file: {e}")))?;

        serde_json::to_writer_pretty(&mut tmp, cache)
            .map_err(|e| Error::cursor_store(format!("failed to serialize cursor state: {e}")))?;

        use std::io::Write;
        tmp.flush()
            .map_err(|e| Error::cursor_store(format!("failed to flush temp file: {e}")))?;

        tmp.persist(&self.path).map_err(|e| {
            Error::cursor_store(format!("failed to rename temp file into place: {e}"))
        })?;

        Ok(())
    }
}

impl CursorStore for JsonFileCursorStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut guard = self.cache.write();
        let previous = guard.clone();
        guard.insert(key.to_string(), value);

        if let Err(e) = self.write_through(&guard) {
            // Roll back the in-memory cache so it never diverges from disk.
            *guard = previous;
            return Err(e);
        }

        Ok(())
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.cache.read().clone()
    }
}
