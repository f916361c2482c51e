//! Admitflow
//!
//! The core behind a multi-section school admission form: a schema-driven
//! validator with conditional field dependencies, repeatable groups, tab
//! gating, and a debounced, race-safe address resolution subsystem.
//!
//! The [`FormSession`] is the single entry point for the presentation
//! layer: it owns the record, resolves effective requirements, validates
//! on every mutation, and applies asynchronous lookup completions from its
//! event channel. Widgets stay on the other side of a narrow contract:
//! raw value changes in, `{ current_value, effective_required, error }`
//! out.

pub mod session;
pub mod view;

pub use session::FormSession;
pub use view::FieldView;

// The session surface re-exports what hosts need without reaching into
// the member crates.
pub use admitflow_address::{LookupConfig, LookupError, PincodeLookup, SlotEvent};
pub use admitflow_engine::{CollectionErrors, ErrorKind, ErrorMap, FieldError, Record};
pub use admitflow_schema::{admission_schema, FormSchema, SchemaError};
