//! Repeatable collection specs.

use crate::field::{FieldReader, FieldSpec, Predicate};

/// Declaration of a collection field: item schema plus collection-level
/// constraints.
///
/// Invariants: every element independently satisfies `item_schema`; with
/// `unique_key` set, no two elements share that key's value.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    /// Name of the collection field in the record.
    pub field: String,
    /// When false against the record, the collection is inapplicable:
    /// treated as valid and cleared on transition.
    pub applicable_when: Option<Predicate>,
    pub item_schema: Vec<FieldSpec>,
    pub min_count: usize,
    pub max_count: Option<usize>,
    /// Item field whose value must be unique across the collection.
    pub unique_key: Option<String>,
    /// Collection-level message for a count violation.
    pub count_message: String,
}

impl GroupSpec {
    pub fn new(
        field: impl Into<String>,
        min_count: usize,
        count_message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            applicable_when: None,
            item_schema: Vec::new(),
            min_count,
            max_count: None,
            unique_key: None,
            count_message: count_message.into(),
        }
    }

    pub fn applicable_when(mut self, predicate: Predicate) -> Self {
        self.applicable_when = Some(predicate);
        self
    }

    pub fn with_max(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn with_unique_key(mut self, key: impl Into<String>) -> Self {
        self.unique_key = Some(key.into());
        self
    }

    /// Append an item field spec.
    pub fn item(mut self, spec: FieldSpec) -> Self {
        self.item_schema.push(spec);
        self
    }

    /// Whether the collection applies for the current record.
    pub fn is_applicable(&self, reader: &dyn FieldReader) -> bool {
        match &self.applicable_when {
            Some(predicate) => predicate.matches(reader),
            None => true,
        }
    }

    pub fn item_field(&self, name: &str) -> Option<&FieldSpec> {
        self.item_schema.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldReader;

    struct Empty;

    impl FieldReader for Empty {
        fn value_text(&self, _field: &str) -> Option<String> {
            None
        }

        fn has_value(&self, _field: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_unconditional_group_applies() {
        let group = GroupSpec::new("previous_schools", 1, "Add at least one school");
        assert!(group.is_applicable(&Empty));
    }

    #[test]
    fn test_conditional_group_inapplicable_when_unset() {
        let group = GroupSpec::new("siblings", 1, "Add at least one sibling")
            .applicable_when(Predicate::equals("has_sibling_in_ihs", "Yes"));
        assert!(!group.is_applicable(&Empty));
    }
}
