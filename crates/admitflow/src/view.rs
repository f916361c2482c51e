//! The per-field contract exposed to the presentation layer.

use admitflow_engine::FieldError;
use serde_json::Value;

/// What a widget needs to render one field.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub current_value: Value,
    /// Resolved from the field's dependency branches against the current
    /// record.
    pub effective_required: bool,
    /// At most one error; advisory lookup errors surface here too.
    pub error: Option<FieldError>,
}
