//! Object storage for uploaded files and split artifacts.
//!
//! Keys are namespaced: originals land under [`UPLOAD_PREFIX`], split
//! artifacts under [`DERIVED_PREFIX`]. The partition is what the event
//! routing relies on to decide which pipeline a creation event feeds, so
//! the two prefixes must never overlap.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

pub mod filesystem;

pub use filesystem::FsObjectStore;

/// Namespace for original uploads.
pub const UPLOAD_PREFIX: &str = "uploads/";

/// Reserved namespace for split artifacts. Writing here never re-triggers
/// the parent pipeline.
pub const DERIVED_PREFIX: &str = "split/";

/// True for keys in the upload namespace.
pub fn is_upload_key(key: &str) -> bool {
    key.starts_with(UPLOAD_PREFIX)
}

/// True for keys in the derived (split-artifact) namespace.
pub fn is_derived_key(key: &str) -> bool {
    key.starts_with(DERIVED_PREFIX)
}

/// Emitted on every successful `put`.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub bucket: String,
    pub key: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("No object with key '{0}'")]
    NotFound(String),

    #[error("IO error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Abstract object store: opaque byte objects addressed by key, plus a
/// creation-notification stream.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes an object. Overwrites an existing object under the same key;
    /// readers never observe a partial write.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Reads an object's bytes.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Subscribes to creation events. Events are only delivered to
    /// receivers that exist at `put` time.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Validates a key before it is mapped onto a filesystem path: relative,
/// forward slashes only, no traversal, no empty segments.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.ends_with('/') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    if key.contains('\\') || PathBuf::from(key).is_absolute() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
