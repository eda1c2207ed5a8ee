//! # Lykeion Core
//!
//! Foundational types for the Lykeion data-access pipeline:
//!
//! - [`Identity`] - Canonical per-invocation caller identity
//! - [`RawIdentity`] - Loose boundary shape normalized once at ingress
//! - [`LykeionError`] - Standard error taxonomy and serializable envelope
//! - [`record`] - Document record conventions (timestamps, non-null merge)
//! - [`fixtures`] - Synthetic identities and records for tests

#![doc(html_root_url = "https://docs.rs/lykeion-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod fixtures;
mod id;
mod identity;
pub mod record;

pub use error::{ErrorEnvelope, ErrorKind, LykeionError, LykeionResult};
pub use id::{new_random_id, new_sortable_id};
pub use identity::{Identity, RawIdentity};
