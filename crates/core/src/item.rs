//! Item identifiers and lifecycle rules for stored JSON documents.
//!
//! An item is an opaque JSON value. When the body is a JSON object the
//! server stamps a `createdAt` field at creation time; the stamp is kept
//! across replace and partial-update operations. Non-object bodies are
//! stored verbatim since there is no field to stamp.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Field added to object bodies at creation time.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Unique identifier for a stored item.
///
/// Backed by a v4 UUID: 128 bits of randomness, and the hyphenated form is
/// safe as a single path segment for both URLs and file names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format a creation timestamp as RFC 3339.
pub fn created_at_stamp(at: OffsetDateTime) -> crate::Result<String> {
    at.format(&Rfc3339)
        .map_err(|e| crate::Error::TimestampFormat(e.to_string()))
}

/// Add the creation timestamp to an object body.
///
/// Non-object values are left untouched.
pub fn stamp_created_at(value: &mut Value, stamp: &str) {
    if let Value::Object(fields) = value {
        fields.insert(CREATED_AT_FIELD.to_string(), Value::String(stamp.to_string()));
    }
}

/// Carry the original creation timestamp into a replacement body.
///
/// `createdAt` is set once at creation and survives full replacement. If the
/// previous value carried no stamp (it was stored as a non-object), or the
/// replacement is not an object, there is nothing to carry.
pub fn preserve_created_at(replacement: &mut Value, previous: &Value) {
    if let (Value::Object(fields), Some(stamp)) = (replacement, previous.get(CREATED_AT_FIELD)) {
        fields.insert(CREATED_AT_FIELD.to_string(), stamp.clone());
    }
}

/// Merge the top-level fields of a patch into an existing value.
///
/// Only top-level keys are replaced; nested objects are not merged
/// recursively. A non-object existing value degenerates to the patch fields
/// alone.
pub fn merge_top_level(existing: &Value, patch: &Map<String, Value>) -> Value {
    let mut merged = match existing {
        Value::Object(fields) => fields.clone(),
        _ => Map::new(),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn item_ids_are_unique_and_path_safe() {
        let a = ItemId::generate().to_string();
        let b = ItemId::generate().to_string();
        assert_ne!(a, b);
        assert!(
            a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
            "id must be a safe path segment: {a}"
        );
    }

    #[test]
    fn stamp_is_rfc3339() {
        let stamp = created_at_stamp(datetime!(2024-05-01 12:30:00 UTC)).unwrap();
        assert_eq!(stamp, "2024-05-01T12:30:00Z");
    }

    #[test]
    fn stamp_added_to_objects_only() {
        let mut object = json!({"title": "t"});
        stamp_created_at(&mut object, "2024-05-01T12:30:00Z");
        assert_eq!(object[CREATED_AT_FIELD], "2024-05-01T12:30:00Z");

        let mut array = json!([1, 2, 3]);
        stamp_created_at(&mut array, "2024-05-01T12:30:00Z");
        assert_eq!(array, json!([1, 2, 3]));
    }

    #[test]
    fn replacement_keeps_original_stamp() {
        let previous = json!({"title": "t", CREATED_AT_FIELD: "2024-05-01T12:30:00Z"});
        let mut replacement = json!({"title": "new"});
        preserve_created_at(&mut replacement, &previous);
        assert_eq!(replacement[CREATED_AT_FIELD], "2024-05-01T12:30:00Z");
    }

    #[test]
    fn replacement_of_unstamped_value_stays_unstamped() {
        let previous = json!("scalar");
        let mut replacement = json!({"title": "new"});
        preserve_created_at(&mut replacement, &previous);
        assert!(replacement.get(CREATED_AT_FIELD).is_none());
    }

    #[test]
    fn merge_replaces_top_level_keys_only() {
        let existing = json!({"title": "t", "content": "c", "meta": {"a": 1}});
        let patch = json!({"content": "x", "meta": {"b": 2}});
        let Value::Object(patch) = patch else {
            unreachable!()
        };

        let merged = merge_top_level(&existing, &patch);
        assert_eq!(merged["title"], "t");
        assert_eq!(merged["content"], "x");
        // Top-level merge: the nested object is replaced wholesale.
        assert_eq!(merged["meta"], json!({"b": 2}));
    }

    #[test]
    fn merge_over_non_object_yields_patch_fields() {
        let existing = json!(42);
        let patch = json!({"content": "x"});
        let Value::Object(patch) = patch else {
            unreachable!()
        };

        let merged = merge_top_level(&existing, &patch);
        assert_eq!(merged, json!({"content": "x"}));
    }
}
