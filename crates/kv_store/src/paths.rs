use std::path::{Path, PathBuf};

pub const STORAGE_DIR: [&str; 2] = [".prompt_forge", "storage"];

const APP_DATA_DIR: &str = "prompt_forge";

#[must_use]
pub fn storage_root(base: &Path) -> PathBuf {
    base.join(STORAGE_DIR[0]).join(STORAGE_DIR[1])
}

/// Platform data directory for the store, or `./.prompt_forge/storage` when none is known.
#[must_use]
pub fn default_storage_root() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join(APP_DATA_DIR).join("storage"),
        None => storage_root(Path::new(".")),
    }
}

#[must_use]
pub fn sanitize_key_for_filename(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' | '.' => '-',
            _ => c,
        })
        .collect()
}

#[must_use]
pub fn value_file_name(key: &str) -> String {
    format!("{}.value", sanitize_key_for_filename(key))
}
