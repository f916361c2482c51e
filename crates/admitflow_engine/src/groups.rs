//! Repeatable group validation and default-value seeding.

use std::collections::BTreeMap;

use admitflow_schema::GroupSpec;
use serde_json::{Map, Value};

use crate::engine::validate_spec;
use crate::errors::{CollectionErrors, FieldError};
use crate::record::{ItemView, Record};

/// Validate one collection field against its group spec.
///
/// An inapplicable collection is valid as a whole; the caller clears its
/// items on transition. Collection-level errors (count, duplicate key)
/// never suppress per-item errors, and vice versa.
pub fn validate_group(group: &GroupSpec, record: &Record) -> CollectionErrors {
    if !group.is_applicable(record) {
        return CollectionErrors::default();
    }

    let items = record.items(&group.field);
    let mut errors = CollectionErrors::default();

    if items.len() < group.min_count {
        errors.collection = Some(FieldError::count(group.count_message.clone()));
    } else if let Some(max) = group.max_count {
        if items.len() > max {
            errors.collection = Some(FieldError::count(format!("At most {max} entries allowed")));
        }
    }

    if errors.collection.is_none() {
        if let Some(key) = &group.unique_key {
            if let Some(duplicate) = first_duplicate(items, key) {
                errors.collection = Some(FieldError::cross_field(format!(
                    "Duplicate {key}: {duplicate}"
                )));
            }
        }
    }

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            tracing::debug!(collection = %group.field, index, "skipping malformed item");
            continue;
        };
        let view = ItemView::new(object);
        let mut item_errors = BTreeMap::new();
        for spec in &group.item_schema {
            if let Some(error) = validate_spec(spec, &view) {
                item_errors.insert(spec.name.clone(), error);
            }
        }
        if !item_errors.is_empty() {
            errors.items.insert(index, item_errors);
        }
    }

    errors
}

/// Seed a fresh item from the group's declared defaults: every scalar
/// unset, nothing copied from existing items. The record assigns the
/// stable `_item_id` at append time.
pub fn seed_item(group: &GroupSpec) -> Value {
    let mut object = Map::new();
    for spec in &group.item_schema {
        object.insert(spec.name.clone(), Value::Null);
    }
    Value::Object(object)
}

fn first_duplicate<'a>(items: &'a [Value], key: &str) -> Option<&'a str> {
    let mut seen: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        let Some(value) = item.get(key).and_then(Value::as_str) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if seen.contains(&value) {
            return Some(value);
        }
        seen.push(value);
    }
    None
}
