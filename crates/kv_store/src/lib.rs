//! Durable key-value storage for small text values.
//!
//! Values are opaque UTF-8 strings addressed by short keys. The file-backed
//! store keeps one file per key and replaces it atomically on every write;
//! the in-memory store backs tests and ephemeral sessions.

mod error;
mod memory;
mod paths;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use paths::{default_storage_root, storage_root, value_file_name};
pub use store::{FileStore, KeyValueStore};
