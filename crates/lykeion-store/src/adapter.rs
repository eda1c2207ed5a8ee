//! The `StoreAdapter` trait.

use async_trait::async_trait;
use lykeion_core::record::Item;

use crate::error::StorageResult;
use crate::types::{Filter, Key, Patch, ScanOutput};

/// Abstract interface to one collection of an external key-value document
/// store.
///
/// Implementations must be thread-safe (`Send + Sync`). The backend is
/// assumed to provide per-key atomic get/put/update/remove; read-after-write
/// consistency across scan/query from a different caller is NOT assumed,
/// so callers applying visibility filters must tolerate slightly stale
/// snapshots.
#[async_trait]
pub trait StoreAdapter: Send + Sync + 'static {
    /// Fetches the item at `key`, or `None` when absent.
    async fn get(&self, key: &Key) -> StorageResult<Option<Item>>;

    /// Stores `item` at `key`, replacing any existing item. Returns the
    /// stored item.
    async fn put(&self, key: &Key, item: Item) -> StorageResult<Item>;

    /// Merges the non-null fields of `patch` into the item at `key` and
    /// returns the updated item.
    ///
    /// Fails with `ItemNotFound` when the key is absent: a partial update
    /// must never fabricate a record.
    async fn update(&self, key: &Key, patch: Patch) -> StorageResult<Item>;

    /// Removes and returns the item at `key`, or `None` when absent.
    async fn remove(&self, key: &Key) -> StorageResult<Option<Item>>;

    /// Scans the entire collection, optionally applying a store-side
    /// equality filter.
    ///
    /// O(collection size) regardless of the result size.
    async fn scan(&self, filter: Option<&Filter>) -> StorageResult<ScanOutput>;

    /// Queries a declared secondary index for items whose indexed attribute
    /// equals `value`, optionally applying a further equality filter.
    async fn query(
        &self,
        index: &str,
        value: &serde_json::Value,
        filter: Option<&Filter>,
    ) -> StorageResult<ScanOutput>;
}
