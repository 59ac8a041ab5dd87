//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use super::{validate_key, ObjectStore, StorageEvent, StoreError};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Object store rooted at a directory. Object keys map to relative paths
/// under the root; writes go through a temp file + rename so a reader
/// never sees partial content under the final key.
pub struct FsObjectStore {
    root: PathBuf,
    bucket: String,
    events: broadcast::Sender<StorageEvent>,
}

impl FsObjectStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let bucket = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "store".to_string());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            root,
            bucket,
            events,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let dir = path.parent().ok_or_else(|| StoreError::InvalidKey(key.to_string()))?;
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;

        // Temp file in the same directory so the rename stays on one
        // filesystem and is atomic.
        let tmp = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }

        tracing::debug!(key, size = bytes.len(), "stored object");

        // No receivers is fine; events are best-effort fan-out.
        let _ = self.events.send(StorageEvent {
            bucket: self.bucket.clone(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::Io {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
