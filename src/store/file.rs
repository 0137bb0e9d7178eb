//! # Flat-File Record Store
//!
//! Layout: `<root>/<collection>/<id>.json`, one JSON document per file.
//!
//! ## Invariants
//! - Create never overwrites: the record is linked into place with
//!   no-clobber semantics after its bytes are fsynced.
//! - Update never exposes a partial record: new content is fsynced to a
//!   temp file in the same directory and renamed over the old file.
//! - Directory entries are fsynced after create, update and delete.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::backend::RecordStore;
use super::errors::{StoreError, StoreResult};
use super::locks::KeyLocks;

const RECORD_EXTENSION: &str = "json";
/// Longest accepted collection or record id
pub const MAX_KEY_LEN: usize = 200;

/// Record store rooted at an explicit data directory
#[derive(Debug)]
pub struct FileRecordStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl FileRecordStore {
    /// Create a store rooted at `root`
    ///
    /// The directory itself is created lazily, together with the first
    /// collection written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyLocks::default(),
        }
    }

    /// Create the directories for the given collections
    pub fn ensure_collections(&self, collections: &[&str]) -> StoreResult<()> {
        for collection in collections {
            let dir = self.collection_dir(collection)?;
            fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        }
        Ok(())
    }

    fn collection_dir(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_key("collection", collection)?;
        Ok(self.root.join(collection))
    }

    fn record_path(&self, collection: &str, id: &str) -> StoreResult<(PathBuf, PathBuf)> {
        let dir = self.collection_dir(collection)?;
        validate_key("id", id)?;
        let path = dir.join(format!("{}.{}", id, RECORD_EXTENSION));
        Ok((dir, path))
    }
}

impl RecordStore for FileRecordStore {
    fn create(&self, collection: &str, id: &str, value: &Value) -> StoreResult<()> {
        let (dir, path) = self.record_path(collection, id)?;
        let _guard = self.locks.lock(collection, id);

        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        if path.exists() {
            return Err(StoreError::already_exists(collection, id));
        }

        let staged = stage(&dir, value)?;
        staged.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StoreError::already_exists(collection, id)
            } else {
                io_error(&path, e.error)
            }
        })?;

        fsync_dir(&dir)
    }

    fn read(&self, collection: &str, id: &str) -> StoreResult<Value> {
        let (_, path) = self.record_path(collection, id)?;
        let _guard = self.locks.lock(collection, id);

        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::not_found(collection, id)
            } else {
                io_error(&path, e)
            }
        })?;

        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(collection, id, e.to_string()))
    }

    fn update(&self, collection: &str, id: &str, value: &Value) -> StoreResult<()> {
        let (dir, path) = self.record_path(collection, id)?;
        let _guard = self.locks.lock(collection, id);

        if !path.is_file() {
            return Err(StoreError::not_found(collection, id));
        }

        let staged = stage(&dir, value)?;
        staged
            .persist(&path)
            .map_err(|e| io_error(&path, e.error))?;

        fsync_dir(&dir)
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let (dir, path) = self.record_path(collection, id)?;
        let _guard = self.locks.lock(collection, id);

        fs::remove_file(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::not_found(collection, id)
            } else {
                io_error(&path, e)
            }
        })?;

        fsync_dir(&dir)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<String>> {
        let dir = self.collection_dir(collection)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            // Staged temp files start with '.', which ids never do
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// Write `value` to a fresh temp file in `dir` and fsync it.
fn stage(dir: &Path, value: &Value) -> StoreResult<NamedTempFile> {
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Encoding(e.to_string()))?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    staged.write_all(&bytes).map_err(|e| io_error(staged.path(), e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| io_error(staged.path(), e))?;

    Ok(staged)
}

/// fsync a directory so entry changes survive a crash.
#[cfg(unix)]
fn fsync_dir(dir: &Path) -> StoreResult<()> {
    let handle = OpenOptions::new()
        .read(true)
        .open(dir)
        .map_err(|e| io_error(dir, e))?;
    handle.sync_all().map_err(|e| io_error(dir, e))
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}

fn validate_key(kind: &str, key: &str) -> StoreResult<()> {
    let unsafe_char = key
        .chars()
        .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());

    if key.is_empty() || key.len() > MAX_KEY_LEN || key.starts_with('.') || unsafe_char {
        return Err(StoreError::InvalidKey(format!("{} {:?}", kind, key)));
    }
    Ok(())
}

fn io_error(path: &Path, e: io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}
