//! Store adapter error types.

use lykeion_core::LykeionError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StorageResult<T> = Result<T, StoreError>;

/// Errors produced by store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced item does not exist.
    #[error("item not found: {key}")]
    ItemNotFound {
        /// Rendered key of the missing item.
        key: String,
    },

    /// The named secondary index is not declared on this collection.
    #[error("unknown index: {index}")]
    UnknownIndex {
        /// The requested index name.
        index: String,
    },

    /// Opaque backend failure.
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<StoreError> for LykeionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::ItemNotFound { key } => {
                Self::not_found(format!("item '{key}' not found"))
            }
            other @ StoreError::UnknownIndex { .. } => {
                Self::internal_with_source("store rejected the operation", other)
            }
            StoreError::Backend(source) => {
                Self::internal_with_source("store backend failure", source)
            }
        }
    }
}
