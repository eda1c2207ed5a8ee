//! Identifier generation.
//!
//! Two flavors are used across the platform: random ids for singleton-keyed
//! resources (courses) and sortable ids for user-scoped resources that are
//! listed in creation order (assessments, templates).

use uuid::Uuid;

/// Generates a collision-resistant random identifier (UUID v4).
#[must_use]
pub fn new_random_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a collision-resistant, creation-time-sortable identifier
/// (UUID v7).
#[must_use]
pub fn new_sortable_id() -> String {
    Uuid::now_v7().to_string()
}
