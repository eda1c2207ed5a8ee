//! Caller identity types.
//!
//! The authentication layer hands the pipeline a loosely shaped identity
//! object: group memberships may appear at the top level or nested inside a
//! claims map under `cognito:groups`, and the preferred display name may be
//! a bare username or an email claim. [`RawIdentity::normalize`] collapses
//! both shapes into the canonical [`Identity`] exactly once per invocation,
//! so policy code only ever reasons about one schema.
//!
//! A resource type fixes which identity field is its owner key:
//! `createdBy`-keyed resources use [`Identity::owner_key`] (email claim or
//! username), while composite-key resources use [`Identity::subject_id`].
//! The two are never interchangeable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// The claims key under which some authentication providers nest groups.
const NESTED_GROUPS_CLAIM: &str = "cognito:groups";

/// The claims key carrying the caller's email.
const EMAIL_CLAIM: &str = "email";

/// Canonical caller identity, immutable for the duration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject identifier assigned by the identity provider.
    pub subject_id: String,
    /// Preferred display name: the email claim when present, else the
    /// provider username. This is the owner key for `createdBy`-keyed
    /// resources.
    pub username: Option<String>,
    /// Unordered group memberships.
    pub groups: BTreeSet<String>,
}

impl Identity {
    /// Creates an identity with the given subject, username, and groups.
    ///
    /// Primarily useful in tests; production identities arrive as
    /// [`RawIdentity`] and are normalized at the boundary.
    #[must_use]
    pub fn new<S, U, G, I>(subject_id: S, username: Option<U>, groups: I) -> Self
    where
        S: Into<String>,
        U: Into<String>,
        G: Into<String>,
        I: IntoIterator<Item = G>,
    {
        Self {
            subject_id: subject_id.into(),
            username: username.map(Into::into),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the identity belongs to the named group.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Returns true if the identity belongs to any of the named groups.
    #[must_use]
    pub fn in_any_group<'a, I: IntoIterator<Item = &'a str>>(&self, groups: I) -> bool {
        groups.into_iter().any(|g| self.in_group(g))
    }

    /// Returns the owner key for `createdBy`-keyed resources.
    #[must_use]
    pub fn owner_key(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never includes claims or other potentially sensitive attributes.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("subject:{}", self.subject_id)
    }
}

/// Loosely shaped identity as supplied by the authentication layer.
///
/// Accepts both shapes the platform produces: groups at the top level
/// (`groups: [...]`) or nested in claims (`claims["cognito:groups"]`), and
/// the email either as a claim or absent entirely.
///
/// # Example
///
/// ```
/// use lykeion_core::RawIdentity;
/// use serde_json::json;
///
/// let raw: RawIdentity = serde_json::from_value(json!({
///     "sub": "u-1",
///     "username": "alice",
///     "claims": { "email": "alice@school.edu", "cognito:groups": ["teachers"] }
/// })).unwrap();
///
/// let identity = raw.normalize();
/// assert_eq!(identity.username.as_deref(), Some("alice@school.edu"));
/// assert!(identity.in_group("teachers"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIdentity {
    /// Subject identifier (`sub`).
    pub sub: String,
    /// Provider username, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Top-level group memberships, when the provider flattens them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Raw claims map; may carry nested groups and the email claim.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub claims: serde_json::Map<String, Value>,
}

impl RawIdentity {
    /// Normalizes this boundary shape into the canonical [`Identity`].
    ///
    /// Groups are the union of the top-level list and the nested claim;
    /// the username prefers the email claim over the bare username.
    #[must_use]
    pub fn normalize(self) -> Identity {
        let mut groups: BTreeSet<String> = self.groups.into_iter().collect();
        if let Some(Value::Array(nested)) = self.claims.get(NESTED_GROUPS_CLAIM) {
            groups.extend(
                nested
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string),
            );
        }

        let email = self
            .claims
            .get(EMAIL_CLAIM)
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Identity {
            subject_id: self.sub,
            username: email.or(self.username),
            groups,
        }
    }
}

impl From<RawIdentity> for Identity {
    fn from(raw: RawIdentity) -> Self {
        raw.normalize()
    }
}
