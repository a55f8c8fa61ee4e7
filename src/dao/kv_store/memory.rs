use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    kv_store::KeyValueStore,
    models::{StoreEntries, StoreKey},
    storage::StorageResult,
};

/// Volatile store used when no file path is configured, and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<StoreEntries>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries(entries: StoreEntries) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[StoreKey]) -> BoxFuture<'static, StorageResult<StoreEntries>> {
        let entries = self.entries.clone();
        let keys = keys.to_vec();
        Box::pin(async move {
            let guard = entries.read().await;
            Ok(keys
                .into_iter()
                .filter_map(|key| guard.get(&key).map(|value| (key, value.clone())))
                .collect())
        })
    }

    fn set(&self, update: StoreEntries) -> BoxFuture<'static, StorageResult<()>> {
        let entries = self.entries.clone();
        Box::pin(async move {
            entries.write().await.extend(update);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn get_returns_only_stored_keys() {
        let store = MemoryStore::new();
        store
            .set(StoreEntries::from([(StoreKey::EndpointUrl, json!("https://example.test"))]))
            .await
            .unwrap();

        let entries = store
            .get(&[StoreKey::EndpointUrl, StoreKey::Users])
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[&StoreKey::EndpointUrl], json!("https://example.test"));
    }

    #[tokio::test]
    async fn set_overwrites_only_given_keys() {
        let store = MemoryStore::with_entries(StoreEntries::from([
            (StoreKey::NotifyUrl, json!("a")),
            (StoreKey::Rate, json!({ "point": 1, "yen": 1 })),
        ]));
        store
            .set(StoreEntries::from([(StoreKey::NotifyUrl, json!("b"))]))
            .await
            .unwrap();

        let entries = store.get(&StoreKey::ALL).await.unwrap();
        assert_eq!(entries[&StoreKey::NotifyUrl], json!("b"));
        assert_eq!(entries[&StoreKey::Rate], json!({ "point": 1, "yen": 1 }));
    }
}
