//! The in-memory record: one mapping from field name to value.
//!
//! The record is the single source of truth for one in-progress
//! application. Scalars are strings, numbers, booleans, ISO dates as
//! strings, or opaque file references; collections are arrays of objects.
//! Every collection item carries a `_item_id` assigned at append time so
//! removal addresses items by identity, never by value equality.

use std::collections::BTreeMap;

use admitflow_schema::FieldReader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reserved item field holding the stable identity of a collection entry.
pub const ITEM_ID_FIELD: &str = "_item_id";

/// One in-progress application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. `Null` removes the entry.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if value.is_null() {
            self.fields.remove(&field);
        } else {
            self.fields.insert(field, value);
        }
    }

    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Items of a collection field; empty for unset or non-array values.
    pub fn items(&self, collection: &str) -> &[Value] {
        match self.fields.get(collection) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Append an item, assigning a fresh `_item_id`. Returns the id.
    pub fn push_item(&mut self, collection: &str, mut item: Value) -> String {
        let id = Uuid::new_v4().to_string();
        if let Some(obj) = item.as_object_mut() {
            obj.insert(ITEM_ID_FIELD.to_string(), Value::String(id.clone()));
        }
        match self.fields.get_mut(collection) {
            Some(Value::Array(items)) => items.push(item),
            _ => {
                self.fields
                    .insert(collection.to_string(), Value::Array(vec![item]));
            }
        }
        id
    }

    /// Remove an item by identity. Returns false when no item matched.
    pub fn remove_item(&mut self, collection: &str, item_id: &str) -> bool {
        let Some(Value::Array(items)) = self.fields.get_mut(collection) else {
            return false;
        };
        let before = items.len();
        items.retain(|item| item_id_of(item) != Some(item_id));
        items.len() != before
    }

    /// Current display index of an item, by identity.
    pub fn item_index(&self, collection: &str, item_id: &str) -> Option<usize> {
        self.items(collection)
            .iter()
            .position(|item| item_id_of(item) == Some(item_id))
    }

    /// Set one field inside a collection item, addressed by identity.
    pub fn set_item_field(
        &mut self,
        collection: &str,
        item_id: &str,
        field: impl Into<String>,
        value: Value,
    ) -> bool {
        let Some(Value::Array(items)) = self.fields.get_mut(collection) else {
            return false;
        };
        for item in items.iter_mut() {
            if item_id_of(item) == Some(item_id) {
                if let Some(obj) = item.as_object_mut() {
                    obj.insert(field.into(), value);
                    return true;
                }
            }
        }
        false
    }
}

/// Stable identity of a collection item.
pub fn item_id_of(item: &Value) -> Option<&str> {
    item.get(ITEM_ID_FIELD).and_then(Value::as_str)
}

/// Empty by the form's definition: unset, null, blank text, empty array.
pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl FieldReader for Record {
    fn value_text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(text_of)
    }

    fn has_value(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !value_is_empty(v))
    }
}

/// Read view over one collection item, scoping item-level rules.
pub struct ItemView<'a> {
    item: &'a Map<String, Value>,
}

impl<'a> ItemView<'a> {
    pub fn new(item: &'a Map<String, Value>) -> Self {
        Self { item }
    }
}

impl FieldReader for ItemView<'_> {
    fn value_text(&self, field: &str) -> Option<String> {
        self.item.get(field).and_then(text_of)
    }

    fn has_value(&self, field: &str) -> bool {
        self.item.get(field).is_some_and(|v| !value_is_empty(v))
    }
}
