//! Error taxonomy and the structured error map.
//!
//! Validation failures are data, not exceptions: every expected failure is
//! recovered into the [`ErrorMap`] and returned to the caller. A field
//! carries at most one error at a time (first failing rule wins).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Conditionally-or-unconditionally required field has no value.
    RequiredMissing,
    /// Type coercion or pattern mismatch.
    FormatInvalid,
    /// Numeric or date bound violation.
    RangeViolation,
    /// Comparator between two fields failed.
    CrossFieldInconsistent,
    /// Repeatable group below min or above max count.
    CollectionCountViolation,
    /// Address resolution failed; advisory, non-blocking.
    ExternalLookupFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::RequiredMissing => "Required missing",
            ErrorKind::FormatInvalid => "Format invalid",
            ErrorKind::RangeViolation => "Range violation",
            ErrorKind::CrossFieldInconsistent => "Cross-field inconsistent",
            ErrorKind::CollectionCountViolation => "Collection count violation",
            ErrorKind::ExternalLookupFailed => "External lookup failed",
        };
        write!(f, "{label}")
    }
}

/// One field's error: a kind plus an opaque message label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequiredMissing, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FormatInvalid, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeViolation, message)
    }

    pub fn cross_field(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CrossFieldInconsistent, message)
    }

    pub fn count(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CollectionCountViolation, message)
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalLookupFailed, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Errors of one repeatable group: a collection-level error (count or
/// duplicate, shown adjacent to the add/remove control) plus per-index
/// item error maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionErrors {
    pub collection: Option<FieldError>,
    pub items: BTreeMap<usize, BTreeMap<String, FieldError>>,
}

impl CollectionErrors {
    pub fn is_empty(&self) -> bool {
        self.collection.is_none() && self.items.values().all(BTreeMap::is_empty)
    }

    pub fn item(&self, index: usize) -> Option<&BTreeMap<String, FieldError>> {
        self.items.get(&index)
    }
}

/// The structured result of a validation pass.
///
/// Advisory errors (external lookup failures) live apart from field and
/// collection errors: they never block tab transitions or submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorMap {
    fields: BTreeMap<String, FieldError>,
    collections: BTreeMap<String, CollectionErrors>,
    advisories: BTreeMap<String, FieldError>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field or collection error is present. Advisories are
    /// not considered.
    pub fn is_clean(&self) -> bool {
        self.fields.is_empty() && self.collections.values().all(CollectionErrors::is_empty)
    }

    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.fields.get(name)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionErrors> {
        self.collections.get(name)
    }

    pub fn advisory(&self, name: &str) -> Option<&FieldError> {
        self.advisories.get(name)
    }

    /// Record or clear one field's error.
    pub fn set_field(&mut self, name: impl Into<String>, error: Option<FieldError>) {
        let name = name.into();
        match error {
            Some(error) => {
                self.fields.insert(name, error);
            }
            None => {
                self.fields.remove(&name);
            }
        }
    }

    /// Record or clear one collection's errors.
    pub fn set_collection(&mut self, name: impl Into<String>, errors: CollectionErrors) {
        let name = name.into();
        if errors.is_empty() {
            self.collections.remove(&name);
        } else {
            self.collections.insert(name, errors);
        }
    }

    /// Record or clear one advisory error.
    pub fn set_advisory(&mut self, name: impl Into<String>, error: Option<FieldError>) {
        let name = name.into();
        match error {
            Some(error) => {
                self.advisories.insert(name, error);
            }
            None => {
                self.advisories.remove(&name);
            }
        }
    }

    /// Replace all blocking errors with a fresh validation result,
    /// preserving advisories.
    pub fn replace_blocking(&mut self, fresh: ErrorMap) {
        self.fields = fresh.fields;
        self.collections = fresh.collections;
    }

    /// Number of blocking errors, items included.
    pub fn error_count(&self) -> usize {
        self.fields.len()
            + self
                .collections
                .values()
                .map(|c| usize::from(c.collection.is_some()) + c.items.values().map(BTreeMap::len).sum::<usize>())
                .sum::<usize>()
    }
}
