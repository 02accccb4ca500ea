use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::paths::value_file_name;

/// Durable string storage addressed by key.
///
/// Implementations must be safe to share across threads; writes replace the
/// previous value wholesale.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store keeping one `<key>.value` file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`. The directory is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::EmptyKey);
        }

        Ok(self.root.join(value_file_name(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::io("reading stored value", path, source)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        fs::create_dir_all(&self.root)
            .map_err(|source| StoreError::io("creating storage directory", &self.root, source))?;

        let mut tmp = NamedTempFile::new_in(&self.root)
            .map_err(|source| StoreError::io("creating temp file", &self.root, source))?;
        let tmp_path = tmp.path().to_path_buf();
        tmp.write_all(value.as_bytes())
            .map_err(|source| StoreError::io("writing temp file", &tmp_path, source))?;
        tmp.flush()
            .map_err(|source| StoreError::io("flushing temp file", &tmp_path, source))?;

        tmp.persist(&path).map_err(|error| StoreError::Persist {
            path,
            source: error.error,
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::io("removing stored value", path, source)),
        }
    }
}
