//! Attachment collection and the file sources behind it.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::ForgeError;

/// A user-supplied file whose text can be read asynchronously.
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;

    /// Size in bytes as reported when the file was added.
    fn size(&self) -> u64;

    /// Reads the whole file as text. Invalid UTF-8 is replaced, not rejected.
    fn read_text(&self) -> BoxFuture<'_, io::Result<String>>;
}

/// File on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl DiskFile {
    /// Captures the file name and size of `path`.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            size: metadata.len(),
            name,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_text(&self) -> BoxFuture<'_, io::Result<String>> {
        async move {
            let bytes = tokio::fs::read(&self.path).await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        .boxed()
    }
}

/// In-memory file, optionally failing or delayed, for hosts without a filesystem.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Vec<u8>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            failure: None,
            delay: None,
        }
    }

    /// Makes every read fail with `message` after the configured delay.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_text(&self) -> BoxFuture<'_, io::Result<String>> {
        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.failure {
                Some(message) => Err(io::Error::other(message.clone())),
                None => Ok(String::from_utf8_lossy(&self.bytes).into_owned()),
            }
        }
        .boxed()
    }
}

/// Display data for one attached file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub name: String,
    pub size: String,
    pub badge: String,
}

/// Attached files in insertion order, unique by `(name, size)`.
#[derive(Clone, Default)]
pub struct AttachmentSet {
    files: Vec<Arc<dyn FileSource>>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `file` unless one with the same name and size is already attached.
    pub fn add(&mut self, file: Arc<dyn FileSource>) -> bool {
        let duplicate = self
            .files
            .iter()
            .any(|existing| existing.name() == file.name() && existing.size() == file.size());
        if duplicate {
            tracing::debug!(name = file.name(), size = file.size(), "skipping duplicate attachment");
            return false;
        }

        self.files.push(file);
        true
    }

    /// Adds every file in order and returns how many were new.
    pub fn add_all(&mut self, files: impl IntoIterator<Item = Arc<dyn FileSource>>) -> usize {
        files.into_iter().filter(|file| self.add(file.clone())).count()
    }

    pub fn remove(&mut self, index: usize) -> Result<Arc<dyn FileSource>, ForgeError> {
        if index >= self.files.len() {
            return Err(ForgeError::out_of_range(index, self.files.len()));
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FileSource>> {
        self.files.iter()
    }

    pub fn summaries(&self) -> Vec<AttachmentSummary> {
        self.files
            .iter()
            .map(|file| AttachmentSummary {
                name: file.name().to_string(),
                size: format_file_size(file.size()),
                badge: file_badge(file.name()),
            })
            .collect()
    }
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base 1024 with at most two decimals, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

/// Short lower-cased extension label, or `...` when it exceeds four characters.
pub fn file_badge(name: &str) -> String {
    let extension = name.rsplit('.').next().unwrap_or(name).to_lowercase();
    if extension.chars().count() <= 4 {
        extension
    } else {
        "...".to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn memory(name: &str, bytes: &str) -> Arc<dyn FileSource> {
        Arc::new(MemoryFile::new(name, bytes.as_bytes()))
    }

    #[test]
    fn same_name_and_size_is_a_duplicate() {
        let mut set = AttachmentSet::new();

        assert!(set.add(memory("x.txt", "0123456789")));
        assert!(!set.add(memory("x.txt", "abcdefghij")));
        assert!(set.add(memory("x.txt", "short")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_all_counts_new_files_in_order() {
        let mut set = AttachmentSet::new();
        let added = set.add_all([memory("a.rs", "a"), memory("b.rs", "b"), memory("a.rs", "z")]);

        assert_eq!(added, 2);
        let names: Vec<&str> = set.iter().map(|file| file.name()).collect();
        assert_eq!(names, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn remove_by_index_and_clear() {
        let mut set = AttachmentSet::new();
        set.add_all([memory("a", "1"), memory("b", "2")]);

        let removed = set.remove(0).expect("index 0 exists");
        assert_eq!(removed.name(), "a");
        assert_eq!(
            set.remove(3).err(),
            Some(ForgeError::IndexOutOfRange { index: 3, len: 1 })
        );

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn file_sizes_use_base_1024_and_trim_zeros() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(10), "10 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576 + 10_486), "1.01 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn badges_are_short_extensions() {
        assert_eq!(file_badge("Main.RS"), "rs");
        assert_eq!(file_badge("archive.tar.gz"), "gz");
        assert_eq!(file_badge("notes.markdown"), "...");
        assert_eq!(file_badge("Makefile"), "...");
        assert_eq!(file_badge("LICENSE"), "...");
        assert_eq!(file_badge("a"), "a");
    }

    #[tokio::test]
    async fn memory_files_decode_lossily() {
        let file = MemoryFile::new("bin.dat", vec![b'o', b'k', 0xff]);
        assert_eq!(file.read_text().await.expect("read"), "ok\u{fffd}");
    }

    #[tokio::test]
    async fn disk_files_report_name_size_and_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# hi").expect("write");

        let file = DiskFile::open(&path).expect("open");
        assert_eq!(file.name(), "note.md");
        assert_eq!(file.size(), 4);
        assert_eq!(file.read_text().await.expect("read"), "# hi");
        assert!(DiskFile::open(dir.path()).is_err());
    }
}
