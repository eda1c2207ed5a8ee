//! Shared test fixtures.
//!
//! Synthetic identities and records used by unit and integration tests
//! across the workspace. Not intended for production use.

use crate::record::{Item, CREATED_BY, IS_PUBLIC};
use crate::Identity;
use serde_json::Value;

/// An admin-tier identity.
#[must_use]
pub fn admin() -> Identity {
    Identity::new("sub-admin", Some("admin@school.edu"), ["admin"])
}

/// A super-admin identity.
#[must_use]
pub fn super_admin() -> Identity {
    Identity::new("sub-super", Some("root@school.edu"), ["super_admin"])
}

/// A teacher identity with the given username.
#[must_use]
pub fn teacher(username: &str) -> Identity {
    Identity::new(format!("sub-{username}"), Some(username), ["teachers"])
}

/// An identity with no group memberships.
#[must_use]
pub fn student(username: &str) -> Identity {
    Identity::new(
        format!("sub-{username}"),
        Some(username),
        Vec::<String>::new(),
    )
}

/// A minimal course record owned by `created_by`.
#[must_use]
pub fn course(id: &str, created_by: &str, is_public: bool) -> Item {
    let mut item = Item::new();
    item.insert("id".to_string(), Value::String(id.to_string()));
    item.insert(
        "name".to_string(),
        Value::String(format!("Course {id}")),
    );
    item.insert(
        CREATED_BY.to_string(),
        Value::String(created_by.to_string()),
    );
    item.insert(IS_PUBLIC.to_string(), Value::Bool(is_public));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{bool_field, string_field};

    #[test]
    fn fixture_identities_have_expected_groups() {
        assert!(admin().in_group("admin"));
        assert!(super_admin().in_group("super_admin"));
        assert!(teacher("t1").in_group("teachers"));
        assert!(student("s1").groups.is_empty());
    }

    #[test]
    fn fixture_course_shape() {
        let item = course("c-1", "t1", true);
        assert_eq!(string_field(&item, "id"), Some("c-1"));
        assert_eq!(string_field(&item, CREATED_BY), Some("t1"));
        assert!(bool_field(&item, IS_PUBLIC));
    }
}
