//! The assembled form schema.

use thiserror::Error;

use crate::address::AddressSlotSpec;
use crate::field::{FieldReader, FieldSpec};
use crate::group::GroupSpec;
use crate::tabs::TabSpec;

/// Schema lookup errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("Unknown address slot: {0}")]
    UnknownSlot(String),

    #[error("Address slot has no copy source: {0}")]
    NoCopySource(String),
}

/// The whole form: scalar fields, collections, tabs, address slots.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
    pub groups: Vec<GroupSpec>,
    pub tabs: Vec<TabSpec>,
    pub address_slots: Vec<AddressSlotSpec>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|g| g.field == name)
    }

    pub fn tab(&self, name: &str) -> Option<&TabSpec> {
        self.tabs.iter().find(|t| t.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&AddressSlotSpec> {
        self.address_slots.iter().find(|s| s.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FieldSpec, SchemaError> {
        self.field(name)
            .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
    }

    pub fn require_group(&self, name: &str) -> Result<&GroupSpec, SchemaError> {
        self.group(name)
            .ok_or_else(|| SchemaError::UnknownCollection(name.to_string()))
    }

    pub fn require_tab(&self, name: &str) -> Result<&TabSpec, SchemaError> {
        self.tab(name)
            .ok_or_else(|| SchemaError::UnknownTab(name.to_string()))
    }

    pub fn require_slot(&self, name: &str) -> Result<&AddressSlotSpec, SchemaError> {
        self.slot(name)
            .ok_or_else(|| SchemaError::UnknownSlot(name.to_string()))
    }

    /// Scalar fields whose effective rule is `Cleared` and which still hold
    /// a value. The caller clears these after each mutation; re-running
    /// until the list is empty settles multi-level dependency chains.
    pub fn clearable_fields(&self, reader: &dyn FieldReader) -> Vec<String> {
        self.fields
            .iter()
            .filter(|spec| spec.effective_rule(reader).cleared && reader.has_value(&spec.name))
            .map(|spec| spec.name.clone())
            .collect()
    }

    /// Collections that are inapplicable for the current record but still
    /// hold items.
    pub fn clearable_groups(&self, reader: &dyn FieldReader) -> Vec<String> {
        self.groups
            .iter()
            .filter(|group| !group.is_applicable(reader) && reader.has_value(&group.field))
            .map(|group| group.field.clone())
            .collect()
    }

    /// The address slot owning a given field, if any.
    pub fn slot_for_field<'a>(&'a self, field: &str) -> Option<&'a AddressSlotSpec> {
        self.address_slots.iter().find(|slot| {
            field == slot.country_field() || field == slot.postal_field()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_name_the_target() {
        let schema = FormSchema {
            fields: vec![FieldSpec::optional("first_name")],
            ..Default::default()
        };
        assert!(schema.require_field("first_name").is_ok());
        let err = schema.require_field("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(matches!(err, SchemaError::UnknownField(_)));
    }
}
