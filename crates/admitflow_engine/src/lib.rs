//! Validation Engine
//!
//! Evaluates the declarative schema against the in-memory record:
//!
//! 1. **Resolve**: each field's effective rule comes from its dependency
//!    branches, re-evaluated against the current record on every pass
//! 2. **Validate**: required-check, then type/format, then range/pattern,
//!    then cross-field - the first failing rule wins, exactly one error
//!    per field
//! 3. **Recurse**: repeatable groups validate count, uniqueness, and each
//!    item independently
//! 4. **Gate**: tabs validate their partition of the field set against the
//!    full record
//!
//! Validation is a pure function of the record at call time. The engine
//! never mutates the record; clearing now-inapplicable values is the
//! caller's job (the schema reports what is clearable).
//!
//! # Modules
//!
//! - [`record`]: the record type and stable collection item identity
//! - [`errors`]: error taxonomy, per-field errors, the structured ErrorMap
//! - [`engine`]: scalar field validation (validate_field/record/subset)
//! - [`groups`]: repeatable group validation and default-value seeding
//! - [`tabs`]: tab partitioning and gating

pub mod engine;
pub mod errors;
pub mod groups;
pub mod record;
pub mod tabs;

pub use engine::{validate_field, validate_record, validate_subset};
pub use errors::{CollectionErrors, ErrorKind, ErrorMap, FieldError};
pub use groups::{seed_item, validate_group};
pub use record::{value_is_empty, ItemView, Record, ITEM_ID_FIELD};
pub use tabs::{fields_for_tab, is_tab_valid};
