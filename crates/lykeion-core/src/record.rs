//! Document record conventions.
//!
//! Stored records are schemaless JSON maps. This module fixes the shared
//! conventions every mutable record follows: `createdAt` is stamped exactly
//! once at creation, `updatedAt` is refreshed on every update, `createdBy`
//! is immutable after creation, and partial updates merge only entries whose
//! value is present and non-null; omitted fields are never cleared.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// A stored record: a flat JSON object, as the document store holds it.
pub type Item = serde_json::Map<String, Value>;

/// Field carrying the immutable creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Field carrying the last-update timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// Field carrying the immutable owner key.
pub const CREATED_BY: &str = "createdBy";

/// Field carrying the public-visibility flag.
pub const IS_PUBLIC: &str = "isPublic";

/// Returns the current UTC time as an ISO-8601 string.
#[must_use]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stamps `createdAt` if the record does not already carry one.
pub fn stamp_created_at(item: &mut Item) {
    if !item.contains_key(CREATED_AT) {
        item.insert(CREATED_AT.to_string(), Value::String(now_iso8601()));
    }
}

/// Unconditionally refreshes `updatedAt`.
pub fn stamp_updated_at(item: &mut Item) {
    item.insert(UPDATED_AT.to_string(), Value::String(now_iso8601()));
}

/// Merges `patch` into `target`, skipping entries whose value is null.
///
/// Fields absent from the patch are left untouched; a null patch value is
/// treated as "not provided", never as a clear.
pub fn merge_non_null(target: &mut Item, patch: Item) {
    for (field, value) in patch {
        if !value.is_null() {
            target.insert(field, value);
        }
    }
}

/// Returns a string field of the record, when present and a string.
#[must_use]
pub fn string_field<'a>(item: &'a Item, field: &str) -> Option<&'a str> {
    item.get(field).and_then(Value::as_str)
}

/// Returns a bool field of the record, defaulting to `false` when absent
/// or not a bool.
#[must_use]
pub fn bool_field(item: &Item, field: &str) -> bool {
    item.get(field).and_then(Value::as_bool).unwrap_or(false)
}
