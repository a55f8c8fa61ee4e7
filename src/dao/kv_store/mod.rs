pub mod file;
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::{
    models::{StoreEntries, StoreKey},
    storage::StorageResult,
};

/// Abstraction over the durable key/value medium backing the form.
///
/// Every call stands alone: there is no transaction across calls, but all
/// entries passed to a single [`KeyValueStore::set`] land in one write.
pub trait KeyValueStore: Send + Sync {
    /// Read the requested keys; keys without a stored value are absent from the result.
    fn get(&self, keys: &[StoreKey]) -> BoxFuture<'static, StorageResult<StoreEntries>>;
    /// Write every entry, replacing previous values of the same keys.
    fn set(&self, entries: StoreEntries) -> BoxFuture<'static, StorageResult<()>>;
    /// Verify the backing medium is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
