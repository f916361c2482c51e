//! Tab partitioning and gating.

use admitflow_schema::{FormSchema, SchemaError};

use crate::engine::validate_subset;
use crate::record::Record;

/// Every name (scalar fields, then collections) a tab gates.
pub fn fields_for_tab(schema: &FormSchema, tab_name: &str) -> Result<Vec<String>, SchemaError> {
    let tab = schema.require_tab(tab_name)?;
    let mut names = tab.fields.clone();
    names.extend(tab.groups.iter().cloned());
    Ok(names)
}

/// True when every field and collection the tab gates validates clean.
/// Advisory lookup errors never block a tab.
pub fn is_tab_valid(
    schema: &FormSchema,
    record: &Record,
    tab_name: &str,
) -> Result<bool, SchemaError> {
    let names = fields_for_tab(schema, tab_name)?;
    Ok(validate_subset(schema, record, &names).is_clean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitflow_schema::admission_schema;
    use serde_json::json;

    #[test]
    fn test_unknown_tab_is_an_error() {
        let schema = admission_schema();
        let record = Record::new();
        assert!(is_tab_valid(&schema, &record, "payments").is_err());
    }

    #[test]
    fn test_declarations_tab_gating() {
        let schema = admission_schema();
        let mut record = Record::new();
        assert!(!is_tab_valid(&schema, &record, "declarations").unwrap());

        record.set("transport_required", json!("No"));
        record.set("declaration_accepted", json!(true));
        assert!(is_tab_valid(&schema, &record, "declarations").unwrap());

        // Transport now applicable, pickup point missing.
        record.set("transport_required", json!("Yes"));
        assert!(!is_tab_valid(&schema, &record, "declarations").unwrap());

        record.set("pickup_point", json!("Main Gate"));
        assert!(is_tab_valid(&schema, &record, "declarations").unwrap());
    }
}
