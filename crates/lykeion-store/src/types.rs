//! Store operation argument and result types.

use lykeion_core::record::Item;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Primary key of a stored item: a partition value and an optional sort
/// value, mirroring the backing store's composite-key model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Partition key value.
    pub partition: String,
    /// Sort key value, for user-scoped collections.
    pub sort: Option<String>,
}

impl Key {
    /// Creates a simple (partition-only) key.
    #[must_use]
    pub fn simple(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    /// Creates a composite key, e.g. `(ownerId, id)` for user-scoped
    /// resources.
    #[must_use]
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort {
            Some(sort) => write!(f, "{}/{}", self.partition, sort),
            None => write!(f, "{}", self.partition),
        }
    }
}

/// A partial update: fields to merge into the stored record.
///
/// Entries with a null value are treated as "not provided" and skipped by
/// the merge; omitted fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Fields to merge.
    pub fields: Item,
}

impl Patch {
    /// Creates a patch from a JSON object.
    #[must_use]
    pub fn new(fields: Item) -> Self {
        Self { fields }
    }

    /// Adds a field to the patch.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }
}

/// An exact-match predicate the store can apply natively.
///
/// This is deliberately the full extent of store-side filtering: the
/// backing store supports only conjunction-free equality, so anything
/// richer (e.g. "owner OR public") must be an application-side post-filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field to compare.
    pub field: String,
    /// Value the field must equal.
    pub equals: Value,
}

impl Filter {
    /// Creates an equality filter.
    #[must_use]
    pub fn eq(field: impl Into<String>, equals: Value) -> Self {
        Self {
            field: field.into(),
            equals,
        }
    }

    /// Returns true if the item satisfies this filter.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        item.get(&self.field) == Some(&self.equals)
    }
}

/// Result of a scan or query: the matching items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Matching items, in no guaranteed order.
    pub items: Vec<Item>,
}
