//! In-memory store backend.
//!
//! Used by tests and local development. One `MemoryStore` models one
//! collection (table) of the external document store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use lykeion_core::record::{merge_non_null, Item};
use tracing::instrument;

use crate::adapter::StoreAdapter;
use crate::error::{StorageResult, StoreError};
use crate::types::{Filter, Key, Patch, ScanOutput};

/// In-memory implementation of [`StoreAdapter`].
///
/// # Performance characteristics
///
/// - **get/put/update/remove**: O(1) average (`DashMap` lookup)
/// - **scan/query**: O(collection size) linear walk; the query path walks
///   the whole collection too, since "indexes" here are declared attribute
///   names rather than materialized structures
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: DashMap<Key, Item>,
    /// Declared secondary indexes: index name -> indexed attribute.
    indexes: Vec<(String, String)>,
}

impl MemoryStore {
    /// Creates an empty collection with no secondary indexes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a secondary index over `attribute`, addressable as `name`.
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.indexes.push((name.into(), attribute.into()));
        self
    }

    /// Creates an empty collection wrapped in `Arc`.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the collection holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &Key) -> StorageResult<Option<Item>> {
        Ok(self.items.get(key).map(|entry| entry.value().clone()))
    }

    #[instrument(skip(self, item), fields(key = %key))]
    async fn put(&self, key: &Key, item: Item) -> StorageResult<Item> {
        self.items.insert(key.clone(), item.clone());
        Ok(item)
    }

    #[instrument(skip(self, patch), fields(key = %key))]
    async fn update(&self, key: &Key, patch: Patch) -> StorageResult<Item> {
        let mut entry = self
            .items
            .get_mut(key)
            .ok_or_else(|| StoreError::ItemNotFound {
                key: key.to_string(),
            })?;
        merge_non_null(entry.value_mut(), patch.fields);
        Ok(entry.value().clone())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn remove(&self, key: &Key) -> StorageResult<Option<Item>> {
        Ok(self.items.remove(key).map(|(_, item)| item))
    }

    #[instrument(skip(self, filter))]
    async fn scan(&self, filter: Option<&Filter>) -> StorageResult<ScanOutput> {
        let items = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|item| filter.map_or(true, |f| f.matches(item)))
            .collect();
        Ok(ScanOutput { items })
    }

    #[instrument(skip(self, value, filter))]
    async fn query(
        &self,
        index: &str,
        value: &serde_json::Value,
        filter: Option<&Filter>,
    ) -> StorageResult<ScanOutput> {
        let attribute = self
            .indexes
            .iter()
            .find(|(name, _)| name == index)
            .map(|(_, attribute)| attribute.clone())
            .ok_or_else(|| StoreError::UnknownIndex {
                index: index.to_string(),
            })?;

        let keyed = Filter::eq(attribute, value.clone());
        let items = self
            .items
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|item| keyed.matches(item))
            .filter(|item| filter.map_or(true, |f| f.matches(item)))
            .collect();
        Ok(ScanOutput { items })
    }
}
