//! # Lykeion Store
//!
//! The store adapter boundary: a thin interface over an external key-value
//! document store exposing get/put/update/remove/scan/query-by-index, plus
//! an in-memory backend used by tests and local development.
//!
//! The adapter assumes the backend provides per-key atomicity; no in-core
//! locking is performed. Timeouts and retries belong to concrete adapters,
//! not to this boundary.

#![doc(html_root_url = "https://docs.rs/lykeion-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod error;
mod memory;
mod types;

pub use adapter::StoreAdapter;
pub use error::{StoreError, StorageResult};
pub use memory::MemoryStore;
pub use types::{Filter, Key, Patch, ScanOutput};
