use std::{io::ErrorKind, path::Path, sync::Arc};

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::dao::{
    kv_store::KeyValueStore,
    models::{StoreEntries, StoreKey},
    storage::StorageResult,
};

use super::{
    config::FileStoreConfig,
    error::{FileStoreError, FileStoreResult},
};

/// Key/value store persisted as a single JSON object on disk.
///
/// Writes are staged in a sibling file and renamed over the document, so a
/// crash mid-write leaves the previous version intact. Keys the store does not
/// know about are preserved untouched.
#[derive(Clone)]
pub struct FileStore {
    config: Arc<FileStoreConfig>,
    write_gate: Arc<Mutex<()>>,
}

impl FileStore {
    /// Prepare the store, creating the parent directory and checking any existing document parses.
    pub async fn open(config: FileStoreConfig) -> FileStoreResult<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| FileStoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let store = Self {
            config: Arc::new(config),
            write_gate: Arc::new(Mutex::new(())),
        };
        let document = store.read_document().await?;
        debug!(
            path = %store.path().display(),
            keys = document.len(),
            "opened file store"
        );
        Ok(store)
    }

    fn path(&self) -> &Path {
        &self.config.path
    }

    async fn read_document(&self) -> FileStoreResult<Map<String, Value>> {
        let bytes = match fs::read(self.path()).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(FileStoreError::Read {
                    path: self.path().to_path_buf(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(_) => Err(FileStoreError::NotAnObject {
                path: self.path().to_path_buf(),
            }),
            Err(source) => Err(FileStoreError::Parse {
                path: self.path().to_path_buf(),
                source,
            }),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> FileStoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|source| FileStoreError::Encode { source })?;
        let staging = self.config.staging_path();

        fs::write(&staging, bytes)
            .await
            .map_err(|source| FileStoreError::Write {
                path: staging.clone(),
                source,
            })?;
        fs::rename(&staging, self.path())
            .await
            .map_err(|source| FileStoreError::Write {
                path: self.path().to_path_buf(),
                source,
            })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, keys: &[StoreKey]) -> BoxFuture<'static, StorageResult<StoreEntries>> {
        let store = self.clone();
        let keys = keys.to_vec();
        Box::pin(async move {
            let mut document = store.read_document().await?;
            Ok(keys
                .into_iter()
                .filter_map(|key| document.remove(key.as_str()).map(|value| (key, value)))
                .collect())
        })
    }

    fn set(&self, entries: StoreEntries) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _gate = store.write_gate.lock().await;
            let mut document = store.read_document().await?;
            for (key, value) in entries {
                document.insert(key.as_str().to_string(), value);
            }
            store.write_document(&document).await.map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.read_document().await?;
            Ok(())
        })
    }
}
