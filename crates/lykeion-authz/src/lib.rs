//! # Lykeion Authz
//!
//! The authorization policy evaluator: pure allow/deny functions computed
//! from the caller [`Identity`](lykeion_core::Identity) and resource
//! attributes. Decisions are computed fresh per call and never persisted.
//!
//! The role model has two privilege tiers that matter: admin-tier groups
//! get full access to all resources of a kind, and the teacher group gets
//! elevated access further gated by resource state (e.g. a course's public
//! flag). Everything else is deny-by-default.

#![doc(html_root_url = "https://docs.rs/lykeion-authz/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod policy;

pub use config::PolicyConfig;
pub use policy::{Decision, PolicyEvaluator};
